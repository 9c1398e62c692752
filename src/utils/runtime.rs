use anyhow::Result;

/// Everything in focuslog runs on one thread: the timer loop, the monitor's sampling task and
/// the terminal front end all cooperate on this runtime.
pub fn single_thread_runtime() -> Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?)
}
