use anyhow::Result;
use larder_core::audio::list_output_devices;

pub fn run() -> Result<()> {
    let devices = list_output_devices()?;

    println!("Audio output devices:");
    for device in &devices {
        let marker = if device.is_default { " (default)" } else { "" };
        println!("  {}{marker}", device.name);
    }
    println!();
    println!("Use one with: larder cook <id> --device \"<name>\"");
    Ok(())
}
