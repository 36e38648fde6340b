use anyhow::Result;
use softserve::environment::Environment;

/// Print the environment report. Never fails the process on missing tools.
pub fn execute(json: bool) -> Result<()> {
    let env = Environment::detect()?;
    if json {
        println!("{}", env.to_json()?);
    } else {
        println!();
        print!("{env}");
    }
    Ok(())
}
