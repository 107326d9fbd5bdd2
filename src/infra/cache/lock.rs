use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::warn;

pub(crate) fn rw_read<'a, T>(
    lock: &'a RwLock<T>,
    target: &'static str,
    op: &'static str,
) -> RwLockReadGuard<'a, T> {
    lock.read().unwrap_or_else(|poisoned| {
        warn!(
            op,
            target_module = target,
            lock_kind = "rwlock.read",
            result = "poisoned_recovered",
            "Recovered from poisoned product cache lock"
        );
        poisoned.into_inner()
    })
}

pub(crate) fn rw_write<'a, T>(
    lock: &'a RwLock<T>,
    target: &'static str,
    op: &'static str,
) -> RwLockWriteGuard<'a, T> {
    lock.write().unwrap_or_else(|poisoned| {
        warn!(
            op,
            target_module = target,
            lock_kind = "rwlock.write",
            result = "poisoned_recovered",
            "Recovered from poisoned product cache lock"
        );
        poisoned.into_inner()
    })
}

#[cfg(test)]
mod tests {
    use std::panic::{AssertUnwindSafe, catch_unwind};

    use super::*;

    #[test]
    fn poisoned_lock_is_recovered() {
        let lock = RwLock::new(1_u8);
        let _ = catch_unwind(AssertUnwindSafe(|| {
            let _guard = lock.write().unwrap();
            panic!("poison the lock");
        }));
        assert!(lock.is_poisoned());

        *rw_write(&lock, "test", "write") = 2;
        assert_eq!(*rw_read(&lock, "test", "read"), 2);
    }
}
