use std::process::ExitCode;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tgtracks::run("tgtracks", tgtracks::commands::upload).await
}
