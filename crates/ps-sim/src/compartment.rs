//! Reference compartment model: named quantities linked by first-order
//! transfers.
//!
//! Each transfer moves `rate * amount(from)` per unit model time out of its
//! source quantity and, when it has a destination, into that quantity.
//! Transfers without a destination are eliminations.

use serde::{Deserialize, Serialize};

use crate::error::{InvokeError, SimError, SimResult};
use crate::model::TransientModel;
use crate::overrides::{ModelOverrideSet, OverrideAttribute};
use crate::path::TargetPath;

/// Amounts below this are treated as integration noise, not as negative mass.
const NEGATIVE_AMOUNT_TOL: f64 = -1e-9;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quantity {
    /// Series name reported in trajectories
    pub name: String,
    pub path: TargetPath,
    pub initial_value: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transfer {
    pub name: String,
    pub from: TargetPath,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<TargetPath>,
    /// First-order rate constant per unit model time
    pub rate: f64,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CompartmentModel {
    name: String,
    quantities: Vec<Quantity>,
    transfers: Vec<Transfer>,
    // Resolved quantity indices, parallel to `transfers`
    links: Vec<Link>,
}

impl CompartmentModel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            quantities: Vec::new(),
            transfers: Vec::new(),
            links: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn quantities(&self) -> &[Quantity] {
        &self.quantities
    }

    pub fn transfers(&self) -> &[Transfer] {
        &self.transfers
    }

    /// Names of the series every trajectory of this model carries, in order.
    pub fn series_names(&self) -> impl Iterator<Item = &str> {
        self.quantities.iter().map(|q| q.name.as_str())
    }

    pub fn add_quantity(&mut self, quantity: Quantity) -> SimResult<()> {
        if quantity.name.trim().is_empty() {
            return Err(SimError::InvalidArg {
                what: "quantity name must be non-empty",
            });
        }
        if self.quantities.iter().any(|q| q.name == quantity.name) {
            return Err(invalid(format!("duplicate quantity name '{}'", quantity.name)));
        }
        if self.quantities.iter().any(|q| q.path == quantity.path) {
            return Err(invalid(format!("duplicate quantity path '{}'", quantity.path)));
        }
        check_amount(quantity.initial_value).map_err(|reason| {
            invalid(format!("quantity '{}' initial value {reason}", quantity.name))
        })?;
        self.quantities.push(quantity);
        Ok(())
    }

    pub fn add_transfer(&mut self, transfer: Transfer) -> SimResult<()> {
        if self.transfers.iter().any(|t| t.name == transfer.name) {
            return Err(invalid(format!("duplicate transfer name '{}'", transfer.name)));
        }
        let from = self.quantity_index(&transfer.from).ok_or_else(|| {
            invalid(format!(
                "transfer '{}' source '{}' is not a quantity",
                transfer.name, transfer.from
            ))
        })?;
        let to = match &transfer.to {
            Some(to) => {
                let idx = self.quantity_index(to).ok_or_else(|| {
                    invalid(format!(
                        "transfer '{}' destination '{}' is not a quantity",
                        transfer.name, to
                    ))
                })?;
                if idx == from {
                    return Err(invalid(format!(
                        "transfer '{}' must connect two different quantities",
                        transfer.name
                    )));
                }
                Some(idx)
            }
            None => None,
        };
        check_amount(transfer.rate)
            .map_err(|reason| invalid(format!("transfer '{}' rate {reason}", transfer.name)))?;
        self.links.push(Link {
            from,
            to,
            rate: transfer.rate,
        });
        self.transfers.push(transfer);
        Ok(())
    }

    /// Quantity addressed by its full path, or by its name as a single segment.
    fn quantity_index(&self, path: &TargetPath) -> Option<usize> {
        self.quantities
            .iter()
            .position(|q| q.path == *path)
            .or_else(|| match path.segments() {
                [name] => self.quantities.iter().position(|q| q.name == *name),
                _ => None,
            })
    }

    fn transfer_index(&self, path: &TargetPath) -> Option<usize> {
        let name = path.to_string();
        self.transfers.iter().position(|t| t.name == name)
    }

    /// Working copy of the dynamics with `overrides` applied. The model
    /// itself is left untouched.
    pub(crate) fn instantiate(
        &self,
        overrides: &ModelOverrideSet,
    ) -> Result<CompartmentDynamics, InvokeError> {
        let mut initial: Vec<f64> = self.quantities.iter().map(|q| q.initial_value).collect();
        let mut links = self.links.clone();

        for entry in overrides.iter() {
            let reject = |reason: String| InvokeError::InvalidOverride {
                target: entry.target.to_string(),
                attribute: entry.attribute,
                reason,
            };
            check_amount(entry.value).map_err(|r| reject(format!("value {r}")))?;
            match entry.attribute {
                OverrideAttribute::InitialValue => {
                    let idx = self
                        .quantity_index(&entry.target)
                        .ok_or_else(|| reject("no quantity at this path".to_string()))?;
                    initial[idx] = entry.value;
                }
                OverrideAttribute::RateConstant => {
                    let idx = self
                        .transfer_index(&entry.target)
                        .ok_or_else(|| reject("no transfer with this name".to_string()))?;
                    links[idx].rate = entry.value;
                }
            }
            tracing::trace!(target_path = %entry.target, attribute = %entry.attribute, value = entry.value, "override applied");
        }

        Ok(CompartmentDynamics {
            names: self.quantities.iter().map(|q| q.name.clone()).collect(),
            initial,
            links,
        })
    }
}

fn invalid(message: String) -> SimError {
    SimError::InvalidModel { message }
}

fn check_amount(v: f64) -> Result<(), String> {
    if !v.is_finite() {
        return Err(format!("must be finite, got {v}"));
    }
    if v < 0.0 {
        return Err(format!("must be non-negative, got {v}"));
    }
    Ok(())
}

#[derive(Clone, Debug, PartialEq)]
struct Link {
    from: usize,
    to: Option<usize>,
    rate: f64,
}

/// Instantiated right-hand side for one invocation.
#[derive(Clone, Debug)]
pub(crate) struct CompartmentDynamics {
    names: Vec<String>,
    initial: Vec<f64>,
    links: Vec<Link>,
}

impl TransientModel for CompartmentDynamics {
    type State = Vec<f64>;

    fn initial_state(&self) -> Vec<f64> {
        self.initial.clone()
    }

    fn rhs(&mut self, _t: f64, x: &Vec<f64>) -> SimResult<Vec<f64>> {
        let mut dx = vec![0.0; x.len()];
        for link in &self.links {
            let flux = link.rate * x[link.from];
            dx[link.from] -= flux;
            if let Some(to) = link.to {
                dx[to] += flux;
            }
        }
        Ok(dx)
    }

    fn add(&self, a: &Vec<f64>, b: &Vec<f64>) -> Vec<f64> {
        a.iter().zip(b).map(|(a, b)| a + b).collect()
    }

    fn scale(&self, a: &Vec<f64>, scale: f64) -> Vec<f64> {
        a.iter().map(|v| v * scale).collect()
    }

    fn check(&self, t: f64, x: &Vec<f64>) -> SimResult<()> {
        match x
            .iter()
            .position(|v| !v.is_finite() || *v < NEGATIVE_AMOUNT_TOL)
        {
            Some(i) => Err(SimError::NonPhysical {
                what: format!("amount of '{}' is {} at t = {t}", self.names[i], x[i]),
            }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(s: &str) -> TargetPath {
        s.parse().unwrap()
    }

    fn oral_model() -> CompartmentModel {
        let mut model = CompartmentModel::new("oral");
        model
            .add_quantity(Quantity {
                name: "GI_Tract".to_string(),
                path: path("GI_Tract/Drug"),
                initial_value: 1.0,
            })
            .unwrap();
        model
            .add_quantity(Quantity {
                name: "Plasma".to_string(),
                path: path("Plasma/Drug"),
                initial_value: 0.0,
            })
            .unwrap();
        model
            .add_transfer(Transfer {
                name: "absorption".to_string(),
                from: path("GI_Tract/Drug"),
                to: Some(path("Plasma/Drug")),
                rate: 0.5,
            })
            .unwrap();
        model
            .add_transfer(Transfer {
                name: "elimination".to_string(),
                from: path("Plasma/Drug"),
                to: None,
                rate: 0.1,
            })
            .unwrap();
        model
    }

    #[test]
    fn rejects_duplicate_and_dangling_definitions() {
        let mut model = oral_model();
        let dup = model.add_quantity(Quantity {
            name: "Plasma".to_string(),
            path: path("Liver/Drug"),
            initial_value: 0.0,
        });
        assert!(dup.is_err());

        let dangling = model.add_transfer(Transfer {
            name: "hepatic".to_string(),
            from: path("Liver/Drug"),
            to: None,
            rate: 0.1,
        });
        assert!(dangling.is_err());

        let negative = model.add_transfer(Transfer {
            name: "bad".to_string(),
            from: path("Plasma/Drug"),
            to: None,
            rate: -1.0,
        });
        assert!(negative.is_err());
    }

    #[test]
    fn rhs_conserves_mass_across_transfers() {
        let model = oral_model();
        let mut dynamics = model.instantiate(&ModelOverrideSet::new("none")).unwrap();
        let dx = dynamics.rhs(0.0, &vec![1.0, 0.5]).unwrap();
        assert!((dx[0] + 0.5).abs() < 1e-12);
        assert!((dx[1] - (0.5 - 0.05)).abs() < 1e-12);
    }

    #[test]
    fn overrides_do_not_touch_base_model() {
        let model = oral_model();
        let set = ModelOverrideSet::single(
            "scan",
            path("GI_Tract/Drug"),
            OverrideAttribute::InitialValue,
            3.0,
        );
        let dynamics = model.instantiate(&set).unwrap();
        assert_eq!(dynamics.initial_state(), vec![3.0, 0.0]);
        assert_eq!(model.quantities()[0].initial_value, 1.0);
    }

    #[test]
    fn quantity_can_be_addressed_by_name() {
        let model = oral_model();
        let set =
            ModelOverrideSet::single("scan", path("Plasma"), OverrideAttribute::InitialValue, 2.0);
        let dynamics = model.instantiate(&set).unwrap();
        assert_eq!(dynamics.initial_state(), vec![1.0, 2.0]);
    }

    #[test]
    fn rate_override_targets_transfer_by_name() {
        let model = oral_model();
        let set = ModelOverrideSet::single(
            "scan",
            path("elimination"),
            OverrideAttribute::RateConstant,
            0.0,
        );
        let mut dynamics = model.instantiate(&set).unwrap();
        let dx = dynamics.rhs(0.0, &vec![0.0, 1.0]).unwrap();
        assert_eq!(dx[1], 0.0);
    }

    #[test]
    fn invalid_overrides_are_iteration_failures() {
        let model = oral_model();
        for (target, attribute, value) in [
            ("Liver/Drug", OverrideAttribute::InitialValue, 1.0),
            ("Plasma/Drug", OverrideAttribute::InitialValue, -1.0),
            ("Plasma/Drug", OverrideAttribute::InitialValue, f64::NAN),
            ("distribution", OverrideAttribute::RateConstant, 1.0),
        ] {
            let set = ModelOverrideSet::single("scan", path(target), attribute, value);
            let err = model.instantiate(&set).unwrap_err();
            assert!(matches!(err, InvokeError::InvalidOverride { .. }), "{target}");
            assert!(!err.is_interrupt());
        }
    }

    #[test]
    fn check_flags_negative_amounts() {
        let model = oral_model();
        let dynamics = model.instantiate(&ModelOverrideSet::new("none")).unwrap();
        assert!(dynamics.check(0.0, &vec![1.0, 0.0]).is_ok());
        assert!(dynamics.check(0.0, &vec![-0.5, 0.0]).is_err());
        assert!(dynamics.check(0.0, &vec![f64::INFINITY, 0.0]).is_err());
    }
}
