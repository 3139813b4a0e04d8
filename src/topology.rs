use std::mem;

use crate::error::Error;

/// Returns the CPUs the process may run on, in ascending order, as reported
/// by `sched_getaffinity`.
pub fn allowed_cpus() -> Result<Vec<usize>, Error> {
    // SAFETY: an all-zero cpu_set_t is the empty set.
    let mut set: libc::cpu_set_t = unsafe { mem::zeroed() };
    // SAFETY: `set` is a valid cpu_set_t and the size passed matches it.
    let ret = unsafe { libc::sched_getaffinity(0, mem::size_of::<libc::cpu_set_t>(), &mut set) };
    if ret == -1 {
        return Err(Error::Affinity(format!(
            "sched_getaffinity: {}",
            std::io::Error::last_os_error()
        )));
    }

    Ok((0..libc::CPU_SETSIZE as usize)
        .filter(|&cpu| unsafe { libc::CPU_ISSET(cpu, &set) })
        .collect())
}

/// Restricts the calling thread to exactly `cpu`.
pub fn pin_current_thread(cpu: usize) -> Result<(), Error> {
    if cpu >= libc::CPU_SETSIZE as usize {
        return Err(Error::Affinity(format!(
            "cpu {} exceeds CPU_SETSIZE ({})",
            cpu,
            libc::CPU_SETSIZE
        )));
    }

    // SAFETY: an all-zero cpu_set_t is the empty set; `cpu` is in range.
    let ret = unsafe {
        let mut set: libc::cpu_set_t = mem::zeroed();
        libc::CPU_SET(cpu, &mut set);
        libc::sched_setaffinity(0, mem::size_of::<libc::cpu_set_t>(), &set)
    };
    if ret == -1 {
        return Err(Error::Affinity(format!(
            "sched_setaffinity(cpu {}): {}",
            cpu,
            std::io::Error::last_os_error()
        )));
    }
    Ok(())
}
