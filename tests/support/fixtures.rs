//! Test fixtures and constants.

/// Password used by every test environment.
pub const PASSWORD: &str = "correct-horse";

/// Standard variables used across multiple tests.
pub const STANDARD_VARIABLES: &[(&str, &str)] = &[
    ("DATABASE_URL", "postgres://localhost/mydb"),
    ("API_KEY", "sk-test-12345"),
    ("JWT_SECRET", "super-secret-jwt-token"),
    ("REDIS_URL", "redis://localhost:6379"),
    ("S3_BUCKET", "my-app-bucket"),
];
