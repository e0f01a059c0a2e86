use std::fmt;

/// Scheduling priority of a managed thread.
///
/// Levels are ordered from `Lowest` to `Highest`. They map onto the range
/// the OS allows for the thread's scheduling policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(u8)]
pub enum Priority {
    Lowest = 0,
    Low = 1,
    #[default]
    Normal = 2,
    High = 3,
    Highest = 4,
}

impl Priority {
    pub const ALL: [Priority; 5] = [
        Priority::Lowest,
        Priority::Low,
        Priority::Normal,
        Priority::High,
        Priority::Highest,
    ];

    /// Map this level into `[min, max]`: the ends go to the bounds, the rest
    /// are spread in quarters between them.
    pub fn map_to_range(self, min: i32, max: i32) -> i32 {
        // i64 holds any i32 span times three
        let (lo, span) = (min as i64, max as i64 - min as i64);
        let mapped = match self {
            Priority::Lowest => return min,
            Priority::Low => lo + span / 4,
            Priority::Normal => lo + span / 2,
            Priority::High => lo + 3 * span / 4,
            Priority::Highest => return max,
        };
        mapped as i32
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Priority::Lowest => "lowest",
            Priority::Low => "low",
            Priority::Normal => "normal",
            Priority::High => "high",
            Priority::Highest => "highest",
        };
        f.write_str(s)
    }
}

#[cfg(unix)]
mod os {
    use super::Priority;

    #[derive(Debug, Clone, Copy)]
    pub(crate) struct NativeThread(libc::pthread_t);

    // Safety: a pthread_t is an opaque identifier; it is only passed back to
    // pthread calls while the thread is known to be alive.
    unsafe impl Send for NativeThread {}
    unsafe impl Sync for NativeThread {}

    pub(crate) fn current() -> NativeThread {
        NativeThread(unsafe { libc::pthread_self() })
    }

    /// Apply `priority` to `thread` under its current scheduling policy.
    /// Returns the OS error code on failure.
    pub(crate) fn apply(thread: NativeThread, priority: Priority) -> Result<(), i32> {
        unsafe {
            let mut policy: libc::c_int = 0;
            let mut param: libc::sched_param = std::mem::zeroed();
            let rc = libc::pthread_getschedparam(thread.0, &mut policy, &mut param);
            if rc != 0 {
                return Err(rc);
            }

            let min = libc::sched_get_priority_min(policy);
            let max = libc::sched_get_priority_max(policy);
            if min < 0 || max < 0 {
                return Err(libc::EINVAL);
            }

            param.sched_priority = priority.map_to_range(min, max);
            match libc::pthread_setschedparam(thread.0, policy, &param) {
                0 => Ok(()),
                rc => Err(rc),
            }
        }
    }
}

// Other targets keep the cached level only.
#[cfg(not(unix))]
mod os {
    use super::Priority;

    #[derive(Debug, Clone, Copy)]
    pub(crate) struct NativeThread;

    pub(crate) fn current() -> NativeThread {
        NativeThread
    }

    pub(crate) fn apply(_thread: NativeThread, _priority: Priority) -> Result<(), i32> {
        Ok(())
    }
}

pub(crate) use os::{apply as apply_native, current as current_native, NativeThread};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_ordering() {
        assert!(Priority::Lowest < Priority::Low);
        assert!(Priority::Low < Priority::Normal);
        assert!(Priority::Normal < Priority::High);
        assert!(Priority::High < Priority::Highest);
        assert_eq!(Priority::default(), Priority::Normal);
    }

    #[test]
    fn test_mapping_is_monotonic() {
        for (min, max) in [(0, 0), (1, 99), (-20, 19), (0, 31)] {
            let mapped: Vec<i32> = Priority::ALL
                .iter()
                .map(|p| p.map_to_range(min, max))
                .collect();
            assert_eq!(mapped[0], min);
            assert_eq!(mapped[4], max);
            assert!(mapped.windows(2).all(|w| w[0] <= w[1]));
        }
    }

    #[test]
    fn test_mapping_wide_ranges() {
        for (min, max) in [(i32::MIN, i32::MAX), (0, 1_000_000_000)] {
            let mapped: Vec<i32> = Priority::ALL
                .iter()
                .map(|p| p.map_to_range(min, max))
                .collect();
            assert_eq!(mapped[0], min);
            assert_eq!(mapped[4], max);
            assert!(mapped.windows(2).all(|w| w[0] <= w[1]));
        }
        assert_eq!(Priority::High.map_to_range(0, 1_000_000_000), 750_000_000);
        assert_eq!(Priority::Normal.map_to_range(i32::MIN, i32::MAX), -1);
    }

    #[test]
    fn test_apply_normal_to_current_thread() {
        // the default policy always accepts its own midpoint
        assert!(apply_native(current_native(), Priority::Normal).is_ok());
    }
}
