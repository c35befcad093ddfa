//! Process exit codes

/// Command completed
pub const EXIT_SUCCESS: i32 = 0;

/// Command completed in memory, but the data directory was not updated
pub const EXIT_WARNING: i32 = 1;

/// Command rejected or board could not be set up
pub const EXIT_ERROR: i32 = 2;
