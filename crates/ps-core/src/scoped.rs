//! Temporary configuration overrides restored on every exit path.
//!
//! [`ScopedConfigOverride`] snapshots the fields it is about to change,
//! applies the new values and restores the snapshot when dropped. Drop runs
//! on normal exit, on `?` early returns and while unwinding from a panic, so
//! the configuration never outlives the scope in its overridden state.
//! Restoration is best-effort: a field that refuses its old value is logged
//! and the remaining fields are still restored.

use std::ops::{Deref, DerefMut};

use tracing::{debug, error, warn};

use crate::config::{ConfigAccess, ConfigField, ConfigValue};
use crate::error::CoreError;
use crate::units::TimeUnit;

/// Field values to apply for the duration of a scope.
///
/// At most one entry per field; setting a field twice keeps the last value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConfigOverrides {
    entries: Vec<(ConfigField, ConfigValue)>,
}

impl ConfigOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, field: ConfigField, value: ConfigValue) {
        if let Some(entry) = self.entries.iter_mut().find(|(f, _)| *f == field) {
            entry.1 = value;
        } else {
            self.entries.push((field, value));
        }
    }

    pub fn with(mut self, field: ConfigField, value: ConfigValue) -> Self {
        self.set(field, value);
        self
    }

    pub fn stop_time(self, stop_time: f64) -> Self {
        self.with(ConfigField::StopTime, ConfigValue::Real(stop_time))
    }

    pub fn time_unit(self, unit: TimeUnit) -> Self {
        self.with(ConfigField::TimeUnit, ConfigValue::TimeUnit(unit))
    }

    pub fn unit_conversion(self, enabled: bool) -> Self {
        self.with(ConfigField::UnitConversion, ConfigValue::Flag(enabled))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(ConfigField, ConfigValue)> {
        self.entries.iter()
    }
}

/// Prior values of the fields a scope has overridden, in application order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConfigurationSnapshot {
    captured: Vec<(ConfigField, ConfigValue)>,
}

impl ConfigurationSnapshot {
    pub fn get(&self, field: ConfigField) -> Option<&ConfigValue> {
        self.captured
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, v)| v)
    }

    pub fn fields(&self) -> impl Iterator<Item = ConfigField> + '_ {
        self.captured.iter().map(|(f, _)| *f)
    }

    pub fn len(&self) -> usize {
        self.captured.len()
    }

    pub fn is_empty(&self) -> bool {
        self.captured.is_empty()
    }
}

/// Exclusive, temporarily overridden view of a configuration.
pub struct ScopedConfigOverride<'a, C: ConfigAccess> {
    config: &'a mut C,
    snapshot: ConfigurationSnapshot,
    rejected: Vec<(ConfigField, CoreError)>,
}

impl<'a, C: ConfigAccess> ScopedConfigOverride<'a, C> {
    /// Capture and override each field in `overrides`.
    ///
    /// Never fails. A field whose new value is rejected by the configuration
    /// keeps its current value, is not captured, and is reported by
    /// [`rejected`](Self::rejected).
    pub fn acquire(config: &'a mut C, overrides: ConfigOverrides) -> Self {
        let mut snapshot = ConfigurationSnapshot::default();
        let mut rejected = Vec::new();

        for (field, value) in overrides.entries {
            let previous = config.get(field);
            match config.set(field, value.clone()) {
                Ok(()) => {
                    debug!(%field, from = %previous, to = %value, "config override applied");
                    snapshot.captured.push((field, previous));
                }
                Err(err) => {
                    warn!(%field, value = %value, error = %err, "config override rejected");
                    rejected.push((field, err));
                }
            }
        }

        Self {
            config,
            snapshot,
            rejected,
        }
    }

    pub fn snapshot(&self) -> &ConfigurationSnapshot {
        &self.snapshot
    }

    pub fn rejected(&self) -> &[(ConfigField, CoreError)] {
        &self.rejected
    }

    /// Restore immediately instead of waiting for the end of the scope.
    pub fn restore_now(self) {
        drop(self);
    }

    fn restore(&mut self) {
        // Reverse order so a field touched twice ends at its oldest value.
        while let Some((field, value)) = self.snapshot.captured.pop() {
            match self.config.set(field, value.clone()) {
                Ok(()) => debug!(%field, to = %value, "config field restored"),
                Err(err) => error!(%field, value = %value, error = %err, "failed to restore config field"),
            }
        }
    }
}

impl<C: ConfigAccess> Deref for ScopedConfigOverride<'_, C> {
    type Target = C;

    fn deref(&self) -> &C {
        self.config
    }
}

impl<C: ConfigAccess> DerefMut for ScopedConfigOverride<'_, C> {
    fn deref_mut(&mut self) -> &mut C {
        self.config
    }
}

impl<C: ConfigAccess> Drop for ScopedConfigOverride<'_, C> {
    fn drop(&mut self) {
        self.restore();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreResult;

    #[derive(Clone, Debug, PartialEq)]
    struct TestConfig {
        stop_time: f64,
        unit: TimeUnit,
        conversion: bool,
        locked: Option<ConfigField>,
    }

    impl Default for TestConfig {
        fn default() -> Self {
            Self {
                stop_time: 10.0,
                unit: TimeUnit::Second,
                conversion: false,
                locked: None,
            }
        }
    }

    impl ConfigAccess for TestConfig {
        fn get(&self, field: ConfigField) -> ConfigValue {
            match field {
                ConfigField::StopTime => ConfigValue::Real(self.stop_time),
                ConfigField::TimeUnit => ConfigValue::TimeUnit(self.unit),
                ConfigField::UnitConversion => ConfigValue::Flag(self.conversion),
            }
        }

        fn set(&mut self, field: ConfigField, value: ConfigValue) -> CoreResult<()> {
            if self.locked == Some(field) {
                return Err(CoreError::Rejected {
                    field,
                    reason: "locked".to_string(),
                });
            }
            match field {
                ConfigField::StopTime => {
                    let v = value.as_real(field)?;
                    if v <= 0.0 {
                        return Err(CoreError::Rejected {
                            field,
                            reason: "must be positive".to_string(),
                        });
                    }
                    self.stop_time = v;
                }
                ConfigField::TimeUnit => self.unit = value.as_time_unit(field)?,
                ConfigField::UnitConversion => self.conversion = value.as_flag(field)?,
            }
            Ok(())
        }
    }

    fn sample_overrides() -> ConfigOverrides {
        ConfigOverrides::new()
            .stop_time(48.0)
            .time_unit(TimeUnit::Hour)
            .unit_conversion(true)
    }

    #[test]
    fn overrides_apply_inside_scope_and_restore_after() {
        let mut config = TestConfig::default();
        {
            let guard = ScopedConfigOverride::acquire(&mut config, sample_overrides());
            assert_eq!(guard.stop_time, 48.0);
            assert_eq!(guard.unit, TimeUnit::Hour);
            assert!(guard.conversion);
            assert_eq!(guard.snapshot().len(), 3);
            assert_eq!(
                guard.snapshot().get(ConfigField::StopTime),
                Some(&ConfigValue::Real(10.0))
            );
        }
        assert_eq!(config, TestConfig::default());
    }

    #[test]
    fn restores_on_early_return() {
        fn failing_scope(config: &mut TestConfig) -> CoreResult<()> {
            let guard = ScopedConfigOverride::acquire(config, sample_overrides());
            guard.get(ConfigField::StopTime).as_flag(ConfigField::StopTime)?;
            Ok(())
        }

        let mut config = TestConfig::default();
        assert!(failing_scope(&mut config).is_err());
        assert_eq!(config, TestConfig::default());
    }

    #[test]
    fn restores_while_unwinding() {
        let mut config = TestConfig::default();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = ScopedConfigOverride::acquire(&mut config, sample_overrides());
            panic!("simulation blew up");
        }));
        assert!(result.is_err());
        assert_eq!(config, TestConfig::default());
    }

    #[test]
    fn rejected_override_is_reported_and_not_captured() {
        let mut config = TestConfig::default();
        {
            let guard = ScopedConfigOverride::acquire(
                &mut config,
                ConfigOverrides::new().stop_time(-1.0).unit_conversion(true),
            );
            assert_eq!(guard.rejected().len(), 1);
            assert_eq!(guard.rejected()[0].0, ConfigField::StopTime);
            assert_eq!(guard.snapshot().len(), 1);
            assert_eq!(guard.stop_time, 10.0);
            assert!(guard.conversion);
        }
        assert_eq!(config, TestConfig::default());
    }

    #[test]
    fn failed_restore_does_not_stop_remaining_fields() {
        let mut config = TestConfig::default();
        {
            let mut guard = ScopedConfigOverride::acquire(&mut config, sample_overrides());
            guard.locked = Some(ConfigField::StopTime);
        }
        assert_eq!(config.stop_time, 48.0);
        assert_eq!(config.unit, TimeUnit::Second);
        assert!(!config.conversion);
    }

    #[test]
    fn restore_now_restores_before_scope_end() {
        let mut config = TestConfig::default();
        let guard = ScopedConfigOverride::acquire(&mut config, sample_overrides());
        guard.restore_now();
        assert_eq!(config, TestConfig::default());
    }

    #[test]
    fn last_value_wins_for_repeated_field() {
        let overrides = ConfigOverrides::new().stop_time(1.0).stop_time(2.0);
        assert_eq!(overrides.len(), 1);
        let mut config = TestConfig::default();
        {
            let guard = ScopedConfigOverride::acquire(&mut config, overrides);
            assert_eq!(guard.stop_time, 2.0);
        }
        assert_eq!(config.stop_time, 10.0);
    }
}
