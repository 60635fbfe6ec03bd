use anyhow::Result;
use report_executor::FormatTag;

pub fn run() -> Result<()> {
    for format in FormatTag::ALL {
        println!("{}", format);
    }
    Ok(())
}
