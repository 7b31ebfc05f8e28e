//! Scan file validation logic.

use std::collections::HashSet;

use crate::schema::{
    AttributeDef, ConfigDef, ConfigOverridesDef, ModelDef, PlotDef, RangeDef, ScanFile, SeriesDef,
    SpacingDef, SweepDef,
};

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("Duplicate ID: {id} in {context}")]
    DuplicateId { id: String, context: String },

    #[error("Missing reference: {id} in {context}")]
    MissingReference { id: String, context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

fn invalid(field: &str, value: impl ToString, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Canonical form of a slash-separated path: trimmed, non-empty segments.
fn normalize_path(path: &str) -> String {
    path.split('/')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

pub fn validate_scan(scan: &ScanFile) -> Result<(), ValidationError> {
    if scan.version == 0 || scan.version > crate::LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: scan.version,
        });
    }
    validate_model(&scan.model)?;
    validate_config(&scan.config)?;
    validate_config_overrides(&scan.config_overrides)?;
    validate_sweep(&scan.sweep, &scan.model)?;
    validate_plot(&scan.plot, &scan.model)?;
    Ok(())
}

fn validate_model(model: &ModelDef) -> Result<(), ValidationError> {
    if model.quantities.is_empty() {
        return Err(invalid("model.quantities", "[]", "at least one quantity is required"));
    }

    let mut names = HashSet::new();
    let mut paths = HashSet::new();
    for q in &model.quantities {
        if q.name.trim().is_empty() {
            return Err(invalid("quantity.name", &q.name, "must be non-empty"));
        }
        if !names.insert(q.name.as_str()) {
            return Err(ValidationError::DuplicateId {
                id: q.name.clone(),
                context: "quantities".to_string(),
            });
        }
        let path = normalize_path(&q.path);
        if path.is_empty() {
            return Err(invalid("quantity.path", &q.path, "must be non-empty"));
        }
        if !paths.insert(path.clone()) {
            return Err(ValidationError::DuplicateId {
                id: path,
                context: "quantity paths".to_string(),
            });
        }
        if !q.initial_value.is_finite() || q.initial_value < 0.0 {
            return Err(invalid(
                &format!("quantity {}.initial_value", q.name),
                q.initial_value,
                "must be finite and non-negative",
            ));
        }
    }

    let mut transfer_names = HashSet::new();
    for t in &model.transfers {
        if !transfer_names.insert(t.name.as_str()) {
            return Err(ValidationError::DuplicateId {
                id: t.name.clone(),
                context: "transfers".to_string(),
            });
        }
        let from =
            find_quantity(model, &t.from).ok_or_else(|| ValidationError::MissingReference {
                id: t.from.clone(),
                context: format!("transfer {} from", t.name),
            })?;
        if let Some(to) = &t.to {
            let to_index = find_quantity(model, to).ok_or_else(|| {
                ValidationError::MissingReference {
                    id: to.clone(),
                    context: format!("transfer {} to", t.name),
                }
            })?;
            if to_index == from {
                return Err(invalid(
                    &format!("transfer {}.to", t.name),
                    to,
                    "source and destination must differ",
                ));
            }
        }
        if !t.rate.is_finite() || t.rate < 0.0 {
            return Err(invalid(
                &format!("transfer {}.rate", t.name),
                t.rate,
                "must be finite and non-negative",
            ));
        }
    }
    Ok(())
}

/// Quantity addressed by full path, or by name for a single-segment target.
fn find_quantity(model: &ModelDef, target: &str) -> Option<usize> {
    let key = normalize_path(target);
    model
        .quantities
        .iter()
        .position(|q| normalize_path(&q.path) == key)
        .or_else(|| {
            if key.contains('/') {
                None
            } else {
                model.quantities.iter().position(|q| q.name == key)
            }
        })
}

fn validate_config(config: &ConfigDef) -> Result<(), ValidationError> {
    if !config.stop_time.is_finite() || config.stop_time < 0.0 {
        return Err(invalid(
            "config.stop_time",
            config.stop_time,
            "must be finite and non-negative",
        ));
    }
    if !config.step_size.is_finite() || config.step_size <= 0.0 {
        return Err(invalid("config.step_size", config.step_size, "must be positive"));
    }
    if config.record_every == 0 {
        return Err(invalid("config.record_every", 0, "must be positive"));
    }
    if config.max_steps == 0 {
        return Err(invalid("config.max_steps", 0, "must be positive"));
    }
    Ok(())
}

fn validate_config_overrides(overrides: &ConfigOverridesDef) -> Result<(), ValidationError> {
    if let Some(stop_time) = overrides.stop_time {
        if !stop_time.is_finite() || stop_time < 0.0 {
            return Err(invalid(
                "config_overrides.stop_time",
                stop_time,
                "must be finite and non-negative",
            ));
        }
    }
    Ok(())
}

fn validate_sweep(sweep: &SweepDef, model: &ModelDef) -> Result<(), ValidationError> {
    let found = match sweep.attribute {
        AttributeDef::InitialValue => find_quantity(model, &sweep.target).is_some(),
        AttributeDef::RateConstant => model
            .transfers
            .iter()
            .any(|t| t.name == sweep.target.trim()),
    };
    if !found {
        return Err(ValidationError::MissingReference {
            id: sweep.target.clone(),
            context: "sweep target".to_string(),
        });
    }

    match (&sweep.values, &sweep.range) {
        (Some(values), None) => validate_values(values),
        (None, Some(range)) => validate_range(range),
        (Some(_), Some(_)) => Err(invalid(
            "sweep",
            "values + range",
            "give either values or range, not both",
        )),
        (None, None) => Err(invalid("sweep", "none", "values or range is required")),
    }
}

fn validate_values(values: &[f64]) -> Result<(), ValidationError> {
    if values.is_empty() {
        return Err(invalid("sweep.values", "[]", "at least one value is required"));
    }
    for (i, v) in values.iter().enumerate() {
        if !v.is_finite() {
            return Err(invalid("sweep.values", v, "must be finite"));
        }
        if values[..i].contains(v) {
            return Err(ValidationError::DuplicateId {
                id: v.to_string(),
                context: "sweep values".to_string(),
            });
        }
    }
    Ok(())
}

fn validate_range(range: &RangeDef) -> Result<(), ValidationError> {
    if !range.start.is_finite() || !range.end.is_finite() {
        return Err(invalid(
            "sweep.range",
            format!("{}..{}", range.start, range.end),
            "bounds must be finite",
        ));
    }
    if range.points < 2 {
        return Err(invalid("sweep.range.points", range.points, "must be at least 2"));
    }
    if range.start == range.end {
        return Err(invalid("sweep.range", range.start, "bounds must differ"));
    }
    if range.spacing == SpacingDef::Logarithmic && (range.start <= 0.0 || range.end <= 0.0) {
        return Err(invalid(
            "sweep.range",
            format!("{}..{}", range.start, range.end),
            "logarithmic spacing needs positive bounds",
        ));
    }
    Ok(())
}

fn validate_plot(plot: &PlotDef, model: &ModelDef) -> Result<(), ValidationError> {
    match &plot.series {
        SeriesDef::Keyword(keyword) if keyword.trim().eq_ignore_ascii_case("all") => {}
        SeriesDef::Keyword(name) => check_series(model, name)?,
        SeriesDef::Names(names) => {
            if names.is_empty() {
                return Err(invalid("plot.series", "[]", "at least one series is required"));
            }
            for name in names {
                check_series(model, name)?;
            }
        }
    }

    let limits = [
        ("plot.axis.x_limits", plot.axis.x_limits),
        ("plot.axis.y_limits", plot.axis.y_limits),
    ];
    for (field, limits) in limits {
        if let Some([min, max]) = limits {
            if !min.is_finite() || !max.is_finite() || min >= max {
                return Err(invalid(field, format!("[{min}, {max}]"), "need finite min < max"));
            }
        }
    }
    if plot.axis.font_size == Some(0) {
        return Err(invalid("plot.axis.font_size", 0, "must be positive"));
    }
    if plot.width == 0 || plot.height == 0 {
        return Err(invalid(
            "plot.size",
            format!("{}x{}", plot.width, plot.height),
            "must be positive",
        ));
    }
    Ok(())
}

/// Series are named after the model's quantities.
fn check_series(model: &ModelDef, name: &str) -> Result<(), ValidationError> {
    if model.quantities.iter().any(|q| q.name == name) {
        Ok(())
    } else {
        Err(ValidationError::MissingReference {
            id: name.to_string(),
            context: "plot series".to_string(),
        })
    }
}
