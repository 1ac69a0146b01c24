//! Reference data loaded into an empty store at startup.

/// (type, rows, seats per row)
pub const DEFAULT_FLEET: &[(&str, i32, i32)] = &[
    ("local", 15, 4),
    ("regional", 20, 5),
    ("international", 25, 6),
];

/// (email, name, password). Only loaded when `app.seed_demo_data` is set.
pub const DEMO_USERS: &[(&str, &str, &str)] = &[
    ("user1@test.com", "Alice", "password"),
    ("user2@test.com", "Bob", "password"),
    ("user3@test.com", "Carol", "password"),
    ("user4@test.com", "Dave", "password"),
];

/// Cost used when hashing demo passwords at startup.
pub const DEMO_HASH_COST: u32 = 8;
