//! Live light-tuning panel
//!
//! Controls are plain data ([`Control`]) describing which field they edit and
//! how. Drawing the panel never mutates anything: every change comes back as a
//! [`ControlEdit`], which [`apply_edit`] writes into the [`ParameterSet`] and
//! the matching light through its setters.

use cgmath::Vector3;

use crate::error::ParamError;
use crate::gfx::scene::{NodeId, SceneGraph};
use crate::params::{Color, ParamValue, ParameterSet};

pub const LIGHTS_SECTION: &str = "lights";
pub const GHOST_SECTION: &str = "ghost";

/// Field a control edits
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlTarget {
    /// Dotted [`ParameterSet`] path mirrored onto its light
    Param(&'static str),
    /// One axis of the moon's position, which has no parameter counterpart
    MoonPosition(usize),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlKind {
    Slider { min: f32, max: f32, step: f32 },
    Number,
    Color,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Control {
    pub section: &'static str,
    pub label: &'static str,
    pub target: ControlTarget,
    pub kind: ControlKind,
}

/// A value the user entered for one control
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlEdit {
    pub target: ControlTarget,
    pub value: ParamValue,
}

const UNIT: ControlKind = ControlKind::Slider {
    min: 0.0,
    max: 1.0,
    step: 0.01,
};
const DISTANCE: ControlKind = ControlKind::Slider {
    min: 0.0,
    max: 100.0,
    step: 0.5,
};
const DECAY: ControlKind = ControlKind::Slider {
    min: 0.0,
    max: 5.0,
    step: 0.1,
};

const fn control(
    section: &'static str,
    label: &'static str,
    path: &'static str,
    kind: ControlKind,
) -> Control {
    Control {
        section,
        label,
        target: ControlTarget::Param(path),
        kind,
    }
}

const fn moon_axis(label: &'static str, axis: usize) -> Control {
    Control {
        section: LIGHTS_SECTION,
        label,
        target: ControlTarget::MoonPosition(axis),
        kind: ControlKind::Number,
    }
}

/// Every control of the panel in display order
pub fn debug_controls() -> Vec<Control> {
    let mut controls = vec![
        control(LIGHTS_SECTION, "ambient intensity", "ambient.intensity", UNIT),
        control(LIGHTS_SECTION, "ambient color", "ambient.color", ControlKind::Color),
        control(LIGHTS_SECTION, "moon intensity", "moon.intensity", UNIT),
        control(LIGHTS_SECTION, "moon color", "moon.color", ControlKind::Color),
        moon_axis("moon x", 0),
        moon_axis("moon y", 1),
        moon_axis("moon z", 2),
        control(LIGHTS_SECTION, "house intensity", "houseLight.intensity", UNIT),
        control(LIGHTS_SECTION, "house color", "houseLight.color", ControlKind::Color),
        control(LIGHTS_SECTION, "house distance", "houseLight.distance", DISTANCE),
        control(LIGHTS_SECTION, "house decay", "houseLight.decay", DECAY),
    ];

    for (color, distance, decay) in [
        ("ghost1.color", "ghost1.distance", "ghost1.decay"),
        ("ghost2.color", "ghost2.distance", "ghost2.decay"),
        ("ghost3.color", "ghost3.distance", "ghost3.decay"),
    ] {
        controls.push(control(GHOST_SECTION, color, color, ControlKind::Color));
        controls.push(control(GHOST_SECTION, distance, distance, DISTANCE));
        controls.push(control(GHOST_SECTION, decay, decay, DECAY));
    }

    controls
}

/// Snaps a slider value onto its step grid inside `min..=max`
pub fn quantize(value: f32, min: f32, max: f32, step: f32) -> f32 {
    let snapped = if step > 0.0 {
        min + ((value - min) / step).round() * step
    } else {
        value
    };
    snapped.clamp(min, max)
}

fn light_node(graph: &SceneGraph, group: &str) -> Option<NodeId> {
    let handles = graph.handles()?;
    match group {
        "ambient" => Some(handles.ambient),
        "moon" => Some(handles.moon),
        "houseLight" => Some(handles.house_light),
        "ghost1" => Some(handles.ghosts[0]),
        "ghost2" => Some(handles.ghosts[1]),
        "ghost3" => Some(handles.ghosts[2]),
        _ => None,
    }
}

/// Current value shown by a control
pub fn current_value(
    target: ControlTarget,
    params: &ParameterSet,
    graph: &SceneGraph,
) -> Result<ParamValue, ParamError> {
    match target {
        ControlTarget::Param(path) => params.get(path),
        ControlTarget::MoonPosition(axis) => {
            let position = graph
                .handles()
                .and_then(|handles| graph.position(handles.moon))
                .unwrap_or(Vector3::new(0.0, 0.0, 0.0));
            Ok(ParamValue::Number(position[axis.min(2)]))
        }
    }
}

/// Writes an edit into the parameter set and onto the light it belongs to
pub fn apply_edit(
    edit: &ControlEdit,
    params: &mut ParameterSet,
    graph: &mut SceneGraph,
) -> Result<(), ParamError> {
    match edit.target {
        ControlTarget::Param(path) => {
            params.set(path, edit.value)?;

            let (group, field) = path
                .split_once('.')
                .ok_or_else(|| ParamError::UnknownPath(path.to_string()))?;
            let Some(light) = light_node(graph, group).and_then(|id| graph.light_mut(id)) else {
                return Ok(());
            };
            match (field, edit.value) {
                ("color", ParamValue::Color(color)) => light.set_color(color),
                ("intensity", ParamValue::Number(v)) => light.set_intensity(v),
                ("distance", ParamValue::Number(v)) => light.set_distance(v),
                ("decay", ParamValue::Number(v)) => light.set_decay(v),
                _ => {}
            }
            log::debug!("{} = {:?}", path, edit.value);
            Ok(())
        }
        ControlTarget::MoonPosition(axis) => {
            let ParamValue::Number(v) = edit.value else {
                return Err(ParamError::TypeMismatch {
                    path: "moon.position".to_string(),
                    expected: "number",
                    found: "non-number",
                });
            };
            if let Some(moon) = graph.handles().map(|handles| handles.moon) {
                if let Some(mut position) = graph.position(moon) {
                    position[axis.min(2)] = v;
                    graph.set_position(moon, position);
                }
            }
            Ok(())
        }
    }
}

/// The panel itself, shown only when requested by the location fragment
pub struct DebugPanel {
    pub visible: bool,
    controls: Vec<Control>,
}

impl DebugPanel {
    pub fn new(visible: bool) -> Self {
        Self {
            visible,
            controls: debug_controls(),
        }
    }

    pub fn controls(&self) -> &[Control] {
        &self.controls
    }

    /// Draws the panel and returns the edits made this frame
    pub fn draw(
        &self,
        ui: &imgui::Ui,
        params: &ParameterSet,
        graph: &SceneGraph,
    ) -> Vec<ControlEdit> {
        let mut edits = Vec::new();
        if !self.visible {
            return edits;
        }

        ui.window("Debug")
            .size([320.0, 520.0], imgui::Condition::FirstUseEver)
            .position([20.0, 20.0], imgui::Condition::FirstUseEver)
            .collapsible(true)
            .build(|| {
                for section in [LIGHTS_SECTION, GHOST_SECTION] {
                    if !ui.collapsing_header(section, imgui::TreeNodeFlags::DEFAULT_OPEN) {
                        continue;
                    }
                    for control in self.controls.iter().filter(|c| c.section == section) {
                        if let Some(edit) = draw_control(ui, control, params, graph) {
                            edits.push(edit);
                        }
                    }
                }
            });

        edits
    }
}

fn draw_control(
    ui: &imgui::Ui,
    control: &Control,
    params: &ParameterSet,
    graph: &SceneGraph,
) -> Option<ControlEdit> {
    let value = match current_value(control.target, params, graph) {
        Ok(value) => value,
        Err(e) => {
            log::warn!("Control `{}` has no value: {}", control.label, e);
            return None;
        }
    };

    let edited = match (control.kind, value) {
        (ControlKind::Slider { min, max, step }, ParamValue::Number(mut v)) => ui
            .slider(control.label, min, max, &mut v)
            .then(|| ParamValue::Number(quantize(v, min, max, step))),
        (ControlKind::Number, ParamValue::Number(mut v)) => ui
            .input_float(control.label, &mut v)
            .build()
            .then_some(ParamValue::Number(v)),
        (ControlKind::Color, ParamValue::Color(color)) => {
            let mut rgb = color.to_array();
            ui.color_edit3(control.label, &mut rgb)
                .then(|| ParamValue::Color(Color::from_array(rgb)))
        }
        _ => None,
    };

    edited.map(|value| ControlEdit {
        target: control.target,
        value,
    })
}
