use anyhow::Result;
use vergen::EmitBuilder;

// Embeds the commit the CLI was built from.
// Falls back to placeholder values outside a git checkout.
fn main() -> Result<()> {
    EmitBuilder::builder()
        .git_sha(true)
        .git_commit_date()
        .emit()?;
    Ok(())
}
