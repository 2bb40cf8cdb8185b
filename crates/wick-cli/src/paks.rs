//! `wick paks`: list the pak files of the current build.

use anyhow::Result;
use wick_core::ServiceState;

pub fn run(service: &ServiceState) -> Result<()> {
    for name in service.get_paks() {
        println!("{}", name);
    }
    Ok(())
}
