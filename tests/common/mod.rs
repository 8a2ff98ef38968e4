#![allow(dead_code)]

use std::sync::Arc;

use diesel::prelude::*;

use finvault_core::db::{self, DbPool};
use finvault_core::schema::users;
use finvault_core::vault::CredentialVault;

pub struct TestContext {
    pub pool: Arc<DbPool>,
    pub vault: Arc<CredentialVault>,
    // Keeps the temporary data directory alive for the lifetime of the test.
    _data_dir: tempfile::TempDir,
}

pub fn setup() -> TestContext {
    let data_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_path = db::init(data_dir.path().to_str().unwrap()).expect("Failed to initialize database");
    let pool = db::create_pool(&db_path).expect("Failed to create database pool");
    let vault = Arc::new(CredentialVault::new(&CredentialVault::generate_key()));

    TestContext {
        pool,
        vault,
        _data_dir: data_dir,
    }
}

pub fn create_user(pool: &DbPool, username: &str) -> i32 {
    let mut conn = db::get_connection(pool).expect("Failed to get database connection");

    diesel::insert_into(users::table)
        .values((
            users::username.eq(username),
            users::password_hash.eq("not-a-real-hash"),
        ))
        .returning(users::id)
        .get_result::<i32>(&mut conn)
        .expect("Failed to insert test user")
}
