use std::process::ExitCode;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tgtracks::run("tgtracks-metadata", tgtracks::commands::export_metadata).await
}
