use modev_data::KEY_MODULE_NAME;
use modev_processor::cargo::BuildScript;

fn main() -> Result<(), Box<dyn std::error::Error>> {
	BuildScript::from_env()?.option(KEY_MODULE_NAME, "demo").run()?;
	Ok(())
}
