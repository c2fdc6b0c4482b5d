//! Scoped management session.

use std::ops::Deref;

use tracing::{debug, warn};

use crate::driver::BaselineDriver;
use crate::error::InventoryResult;

/// An open management session that is closed exactly once.
///
/// The session is released by [`DeviceSession::close`] or, on every other
/// exit path, when the guard is dropped. Releasing twice is a no-op, and a
/// driver whose transport is already gone is not closed again.
pub struct DeviceSession<'a, D: BaselineDriver + ?Sized> {
    driver: &'a mut D,
    released: bool,
}

impl<'a, D: BaselineDriver + ?Sized> DeviceSession<'a, D> {
    /// Opens the session.
    pub fn open(driver: &'a mut D) -> InventoryResult<Self> {
        debug!(host = %driver.hostname(), "opening management session");
        driver.open()?;
        Ok(Self {
            driver,
            released: false,
        })
    }

    /// Returns the driver behind the session.
    pub fn driver(&self) -> &D {
        self.driver
    }

    /// Closes the session, reporting a close failure to the caller.
    pub fn close(mut self) -> InventoryResult<()> {
        self.release()
    }

    fn release(&mut self) -> InventoryResult<()> {
        if self.released {
            return Ok(());
        }
        self.released = true;

        if !self.driver.is_open() {
            debug!(host = %self.driver.hostname(), "session already closed");
            return Ok(());
        }

        debug!(host = %self.driver.hostname(), "closing management session");
        self.driver.close()
    }
}

/// Runs `f` inside an open session and closes it afterwards.
///
/// A close failure is reported only when `f` itself succeeded.
pub fn with_session<D, T, F>(driver: &mut D, f: F) -> InventoryResult<T>
where
    D: BaselineDriver + ?Sized,
    F: FnOnce(&D) -> InventoryResult<T>,
{
    let session = DeviceSession::open(driver)?;
    let value = f(session.driver())?;
    session.close()?;
    Ok(value)
}

impl<D: BaselineDriver + ?Sized> Deref for DeviceSession<'_, D> {
    type Target = D;

    fn deref(&self) -> &D {
        self.driver
    }
}

impl<D: BaselineDriver + ?Sized> Drop for DeviceSession<'_, D> {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            warn!(host = %self.driver.hostname(), error = %e, "failed to close session");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{Facts, GenericNeighborTable, InterfaceTable, IpTable};
    use crate::error::InventoryError;
    use pretty_assertions::assert_eq;

    #[derive(Default)]
    struct CountingDriver {
        open: bool,
        opens: usize,
        closes: usize,
        fail_open: bool,
    }

    impl BaselineDriver for CountingDriver {
        fn hostname(&self) -> &str {
            "sw1"
        }

        fn open(&mut self) -> InventoryResult<()> {
            if self.fail_open {
                return Err(InventoryError::session("sw1", "connection refused"));
            }
            self.opens += 1;
            self.open = true;
            Ok(())
        }

        fn close(&mut self) -> InventoryResult<()> {
            self.closes += 1;
            self.open = false;
            Ok(())
        }

        fn is_open(&self) -> bool {
            self.open
        }

        fn facts(&self) -> InventoryResult<Facts> {
            Ok(Facts::default())
        }

        fn interfaces(&self) -> InventoryResult<InterfaceTable> {
            Ok(InterfaceTable::new())
        }

        fn interface_ip_table(&self) -> InventoryResult<IpTable> {
            Ok(IpTable::new())
        }

        fn generic_neighbors(&self) -> InventoryResult<GenericNeighborTable> {
            Ok(GenericNeighborTable::new())
        }
    }

    #[test]
    fn test_close_once() {
        let mut driver = CountingDriver::default();
        let session = DeviceSession::open(&mut driver).unwrap();
        assert!(session.is_open());
        session.close().unwrap();

        assert_eq!(driver.opens, 1);
        assert_eq!(driver.closes, 1);
    }

    #[test]
    fn test_drop_releases() {
        let mut driver = CountingDriver::default();
        {
            let _session = DeviceSession::open(&mut driver).unwrap();
        }
        assert_eq!(driver.closes, 1);
        assert!(!driver.open);
    }

    #[test]
    fn test_drop_after_early_error_path() {
        fn failing_poll(driver: &mut CountingDriver) -> InventoryResult<()> {
            let session = DeviceSession::open(driver)?;
            session.interfaces()?;
            Err(InventoryError::driver("get_interfaces", "boom"))
        }

        let mut driver = CountingDriver::default();
        assert!(failing_poll(&mut driver).is_err());
        assert_eq!(driver.closes, 1);
    }

    #[test]
    fn test_open_failure_does_not_close() {
        let mut driver = CountingDriver {
            fail_open: true,
            ..CountingDriver::default()
        };
        assert!(DeviceSession::open(&mut driver).is_err());
        assert_eq!(driver.closes, 0);
    }

    #[test]
    fn test_with_session() {
        let mut driver = CountingDriver::default();
        let open = with_session(&mut driver, |d| Ok(d.is_open())).unwrap();
        assert!(open);
        assert_eq!(driver.closes, 1);

        let err = with_session(&mut driver, |_| -> InventoryResult<()> {
            Err(InventoryError::driver("get_facts", "boom"))
        });
        assert!(err.is_err());
        assert_eq!(driver.opens, 2);
        assert_eq!(driver.closes, 2);
    }

    #[test]
    fn test_transport_already_gone() {
        let mut driver = CountingDriver::default();
        let mut session = DeviceSession::open(&mut driver).unwrap();
        session.driver.open = false;
        session.release().unwrap();
        session.release().unwrap();
        drop(session);
        assert_eq!(driver.closes, 0);
    }
}
