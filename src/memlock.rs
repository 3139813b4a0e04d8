/// Locks current and future pages into RAM so page faults and TLB shootdowns
/// do not show up as hiccups. Failure only degrades the measurement: it is
/// logged and `false` is returned.
pub fn lock_all() -> bool {
    // SAFETY: mlockall takes no pointers.
    let ret = unsafe { libc::mlockall(libc::MCL_CURRENT | libc::MCL_FUTURE) };
    if ret == -1 {
        log::warn!(
            "mlockall: {}; failed to lock memory, increase RLIMIT_MEMLOCK or run with CAP_IPC_LOCK capability",
            std::io::Error::last_os_error()
        );
        return false;
    }
    log::debug!("locked process memory");
    true
}
