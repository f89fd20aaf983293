use habitflow_core::Database;

use super::open_session;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let session = open_session(&db)?;
    println!("{}", serde_json::to_string_pretty(&session.stats())?);
    Ok(())
}
