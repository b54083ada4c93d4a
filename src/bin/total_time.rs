use std::process::ExitCode;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tgtracks::run("tgtracks-total-time", tgtracks::commands::total_time).await
}
