//! Turn a validated scan file into runtime objects.

use ps_core::ConfigOverrides;
use ps_plot::{AxisProperty, LabelOverrides, Layout, PlotRequest, Scale, SeriesSelection};
use ps_project::{
    AttributeDef, ConfigDef, ConfigOverridesDef, IntegratorDef, LayoutDef, ModelDef, PlotDef,
    ScaleDef, ScanFile, SeriesDef, SpacingDef, SweepDef,
};
use ps_sim::{
    CompartmentModel, IntegratorType, OverrideAttribute, Quantity, SimConfig, TargetPath, Transfer,
};
use ps_sweep::{Spacing, SweepRange, SweepSpecification};

use crate::error::{AppError, AppResult};

/// Everything needed to run one scan.
#[derive(Debug, Clone)]
pub struct CompiledScan {
    pub name: String,
    pub model: CompartmentModel,
    pub config: SimConfig,
    pub overrides: ConfigOverrides,
    pub sweep: SweepSpecification,
    pub plot: PlotRequest,
    pub plot_size: (u32, u32),
}

pub fn compile_scan(scan: &ScanFile) -> AppResult<CompiledScan> {
    Ok(CompiledScan {
        name: scan.name.clone(),
        model: build_model(&scan.model)?,
        config: build_config(&scan.config),
        overrides: build_config_overrides(&scan.config_overrides),
        sweep: build_sweep(&scan.sweep)?,
        plot: build_plot_request(&scan.plot)?,
        plot_size: (scan.plot.width, scan.plot.height),
    })
}

fn parse_path(path: &str) -> AppResult<TargetPath> {
    path.parse()
        .map_err(|e| AppError::Compile(format!("invalid path '{path}': {e}")))
}

pub fn build_model(def: &ModelDef) -> AppResult<CompartmentModel> {
    let mut model = CompartmentModel::new(def.name.clone());
    for q in &def.quantities {
        model.add_quantity(Quantity {
            name: q.name.clone(),
            path: parse_path(&q.path)?,
            initial_value: q.initial_value,
        })?;
    }
    for t in &def.transfers {
        model.add_transfer(Transfer {
            name: t.name.clone(),
            from: parse_path(&t.from)?,
            to: t.to.as_deref().map(parse_path).transpose()?,
            rate: t.rate,
        })?;
    }
    Ok(model)
}

pub fn build_config(def: &ConfigDef) -> SimConfig {
    SimConfig {
        stop_time: def.stop_time,
        time_unit: def.time_unit,
        unit_conversion: def.unit_conversion,
        step_size: def.step_size,
        record_every: def.record_every,
        max_steps: def.max_steps,
        integrator: match def.integrator {
            IntegratorDef::Rk4 => IntegratorType::RK4,
            IntegratorDef::ForwardEuler => IntegratorType::ForwardEuler,
        },
    }
}

pub fn build_config_overrides(def: &ConfigOverridesDef) -> ConfigOverrides {
    let mut overrides = ConfigOverrides::new();
    if let Some(stop_time) = def.stop_time {
        overrides = overrides.stop_time(stop_time);
    }
    if let Some(unit) = def.time_unit {
        overrides = overrides.time_unit(unit);
    }
    if let Some(enabled) = def.unit_conversion {
        overrides = overrides.unit_conversion(enabled);
    }
    overrides
}

pub fn build_sweep(def: &SweepDef) -> AppResult<SweepSpecification> {
    let target = parse_path(&def.target)?;
    let spec = match (&def.values, &def.range) {
        (Some(values), None) => SweepSpecification::new(target, values.clone())?,
        (None, Some(range)) => {
            let range = SweepRange {
                start: range.start,
                end: range.end,
                points: range.points,
                spacing: match range.spacing {
                    SpacingDef::Linear => Spacing::Linear,
                    SpacingDef::Logarithmic => Spacing::Logarithmic,
                },
            };
            SweepSpecification::from_range(target, &range)?
        }
        _ => {
            return Err(AppError::Compile(
                "sweep needs exactly one of values or range".to_string(),
            ));
        }
    };
    let attribute = match def.attribute {
        AttributeDef::InitialValue => OverrideAttribute::InitialValue,
        AttributeDef::RateConstant => OverrideAttribute::RateConstant,
    };
    Ok(spec.with_attribute(attribute))
}

fn scale(def: ScaleDef) -> Scale {
    match def {
        ScaleDef::Linear => Scale::Linear,
        ScaleDef::Log => Scale::Log,
    }
}

pub fn build_plot_request(def: &PlotDef) -> AppResult<PlotRequest> {
    let series = match &def.series {
        SeriesDef::Keyword(keyword) => keyword
            .parse::<SeriesSelection>()
            .map_err(|e| AppError::Compile(e.to_string()))?,
        SeriesDef::Names(names) => SeriesSelection::Named(names.clone()),
    };
    let layout = match def.layout {
        LayoutDef::Overlay => Layout::Overlay,
        LayoutDef::Trellis => Layout::Trellis,
    };

    let mut request = PlotRequest::new(series)
        .with_layout(layout)
        .with_labels(LabelOverrides {
            title: def.title.clone(),
            xlabel: def.xlabel.clone(),
            ylabel: def.ylabel.clone(),
        });

    let axis = &def.axis;
    if let Some([min, max]) = axis.x_limits {
        request = request.with_axis_property(AxisProperty::XLimits { min, max });
    }
    if let Some([min, max]) = axis.y_limits {
        request = request.with_axis_property(AxisProperty::YLimits { min, max });
    }
    if let Some(s) = axis.x_scale {
        request = request.with_axis_property(AxisProperty::XScale { scale: scale(s) });
    }
    if let Some(s) = axis.y_scale {
        request = request.with_axis_property(AxisProperty::YScale { scale: scale(s) });
    }
    if let Some(visible) = axis.grid {
        request = request.with_axis_property(AxisProperty::Grid { visible });
    }
    if let Some(size) = axis.font_size {
        request = request.with_axis_property(AxisProperty::FontSize { size });
    }
    Ok(request)
}
