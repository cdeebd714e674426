//! Tabletop scene XML from a compact text description
//!
//! Records are separated by `:` and fields by `,`:
//!
//! ```text
//! tabletop,xspan,20,yspan,12:
//! block,location,1,2,0.5,id,b1,color,red:
//! composite,location,0,0,0,id,pair,block,location,0,0,1,sphere,location,0,0,2,radius,0.5:
//! include,tablesetup/def-room.xml:
//! instance,room,var,location,4,0,0.25,var,xspan,10
//! ```
//!
//! `location` and `rotation` take three values, every other key one.

use crate::core::error::{Result, WizardError};
use std::collections::HashMap;
use std::fmt::Write;

pub const TABLETOP_NAMESPACE: &str = "http://synapse.cs.umd.edu/tabletop-xml";

const SIMPLE_TYPES: [&str; 5] = ["block", "cylinder", "sphere", "box", "custom"];
const COMPOSITE: &str = "composite";

/// Attributes after `location`, in output order
const SIMPLE_ATTRIBUTES: [&str; 11] = [
    "id", "rotation", "mass", "color", "xspan", "yspan", "zspan", "radius", "thickness", "file",
    "scale",
];
const COMPOSITE_ATTRIBUTES: [&str; 3] = ["id", "rotation", "mass"];

/// Keys whose value is an (x, y, z) triple
fn is_triple(key: &str) -> bool {
    key == "location" || key == "rotation"
}

fn is_child_type(token: &str) -> bool {
    token == COMPOSITE || SIMPLE_TYPES.contains(&token)
}

#[derive(Debug, Clone, PartialEq)]
enum Element {
    Simple {
        kind: String,
        attributes: HashMap<String, String>,
    },
    Composite {
        attributes: HashMap<String, String>,
        children: Vec<Element>,
    },
    Include(String),
    Instance {
        def: String,
        vars: Vec<(String, String)>,
    },
}

#[derive(Debug, Default)]
struct Scene {
    spans: HashMap<String, String>,
    elements: Vec<Element>,
}

/// Generate tabletop XML for a scene description
pub fn generate(description: &str) -> Result<String> {
    let scene = parse_scene(description)?;
    tracing::debug!("Parsed scene with {} top-level elements", scene.elements.len());
    Ok(render(&scene))
}

fn scene_error(record: &[&str], problem: impl std::fmt::Display) -> WizardError {
    WizardError::Scene(format!("{problem} in record '{}'", record.join(",")))
}

fn parse_scene(description: &str) -> Result<Scene> {
    let mut scene = Scene::default();

    for record in description.split(':') {
        let fields: Vec<&str> = record.split(',').map(str::trim).collect();
        let Some((&head, rest)) = fields.split_first() else {
            continue;
        };
        match head {
            "" if rest.is_empty() => continue,
            "tabletop" => {
                let (spans, _) = parse_attributes(&fields, rest, |_| false)?;
                scene.spans = spans;
            }
            "include" => {
                let file = rest
                    .first()
                    .filter(|f| !f.is_empty())
                    .ok_or_else(|| scene_error(&fields, "missing file"))?;
                scene.elements.push(Element::Include(file.to_string()));
            }
            "instance" => scene.elements.push(parse_instance(&fields, rest)?),
            COMPOSITE => scene.elements.push(parse_composite(&fields, rest)?),
            kind if SIMPLE_TYPES.contains(&kind) => {
                let (attributes, _) = parse_attributes(&fields, rest, |_| false)?;
                require_location(&fields, &attributes)?;
                scene.elements.push(Element::Simple {
                    kind: kind.to_string(),
                    attributes,
                });
            }
            other => return Err(scene_error(&fields, format!("unknown element '{other}'"))),
        }
    }

    Ok(scene)
}

/// Read key/value pairs until `stop` matches a key, returning the remainder
fn parse_attributes<'a>(
    record: &[&str],
    mut tokens: &'a [&'a str],
    stop: impl Fn(&str) -> bool,
) -> Result<(HashMap<String, String>, &'a [&'a str])> {
    let mut attributes = HashMap::new();

    while let Some((&key, rest)) = tokens.split_first() {
        if stop(key) {
            break;
        }
        let arity = if is_triple(key) { 3 } else { 1 };
        if rest.len() < arity {
            return Err(scene_error(record, format!("missing value for '{key}'")));
        }
        let value = if arity == 3 {
            format!("({},{},{})", rest[0], rest[1], rest[2])
        } else {
            rest[0].to_string()
        };
        attributes.insert(key.to_string(), value);
        tokens = &rest[arity..];
    }

    Ok((attributes, tokens))
}

fn require_location(record: &[&str], attributes: &HashMap<String, String>) -> Result<()> {
    if attributes.contains_key("location") {
        Ok(())
    } else {
        Err(scene_error(record, "missing location"))
    }
}

fn parse_composite(record: &[&str], tokens: &[&str]) -> Result<Element> {
    let (attributes, mut rest) = parse_attributes(record, tokens, is_child_type)?;
    require_location(record, &attributes)?;

    let mut children = Vec::new();
    while let Some((&kind, tail)) = rest.split_first() {
        if kind == COMPOSITE {
            // a nested composite owns everything after it
            children.push(parse_composite(record, tail)?);
            break;
        }
        let (child_attributes, next) = parse_attributes(record, tail, is_child_type)?;
        require_location(record, &child_attributes)?;
        children.push(Element::Simple {
            kind: kind.to_string(),
            attributes: child_attributes,
        });
        rest = next;
    }

    Ok(Element::Composite {
        attributes,
        children,
    })
}

fn parse_instance(record: &[&str], tokens: &[&str]) -> Result<Element> {
    let (&def, mut rest) = tokens
        .split_first()
        .ok_or_else(|| scene_error(record, "missing instance definition"))?;

    let mut vars = Vec::new();
    while let Some((&marker, tail)) = rest.split_first() {
        if marker != "var" {
            return Err(scene_error(record, format!("expected 'var', found '{marker}'")));
        }
        let (&name, values) = tail
            .split_first()
            .ok_or_else(|| scene_error(record, "missing var name"))?;
        if is_triple(name) {
            if values.len() < 3 {
                return Err(scene_error(record, format!("missing value for '{name}'")));
            }
            let mut coords = [0.0f64; 3];
            for (slot, raw) in coords.iter_mut().zip(&values[..3]) {
                *slot = raw
                    .parse()
                    .map_err(|_| scene_error(record, format!("'{raw}' is not a number")))?;
            }
            vars.push((
                name.to_string(),
                format!("({:?}, {:?}, {:?})", coords[0], coords[1], coords[2]),
            ));
            rest = &values[3..];
        } else {
            let value = values
                .first()
                .ok_or_else(|| scene_error(record, format!("missing value for '{name}'")))?;
            vars.push((name.to_string(), value.to_string()));
            rest = &values[1..];
        }
    }

    Ok(Element::Instance {
        def: def.to_string(),
        vars,
    })
}

fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('\'', "&apos;")
}

fn write_attributes(out: &mut String, attributes: &HashMap<String, String>, order: &[&str]) {
    for key in std::iter::once(&"location").chain(order) {
        if let Some(value) = attributes.get(*key) {
            let _ = write!(out, " {key}=\"{}\"", escape(value));
        }
    }
}

fn render_element(out: &mut String, element: &Element, depth: usize) {
    let indent = "\t".repeat(depth);
    match element {
        Element::Simple { kind, attributes } => {
            let _ = write!(out, "{indent}<{kind}");
            write_attributes(out, attributes, &SIMPLE_ATTRIBUTES);
            out.push_str("/>\n");
        }
        Element::Composite {
            attributes,
            children,
        } => {
            let _ = write!(out, "{indent}<{COMPOSITE}");
            write_attributes(out, attributes, &COMPOSITE_ATTRIBUTES);
            out.push_str(">\n");
            for child in children {
                render_element(out, child, depth + 1);
            }
            let _ = writeln!(out, "{indent}</{COMPOSITE}>");
        }
        Element::Include(file) => {
            let _ = writeln!(out, "{indent}<include file=\"{}\"/>", escape(file));
        }
        Element::Instance { def, vars } => {
            let _ = writeln!(out, "{indent}<instance def=\"{}\">", escape(def));
            for (name, value) in vars {
                let _ = writeln!(
                    out,
                    "{indent}\t<var name=\"{}\" value=\"{}\"/>",
                    escape(name),
                    escape(value)
                );
            }
            let _ = writeln!(out, "{indent}</instance>");
        }
    }
}

fn render(scene: &Scene) -> String {
    let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    let _ = write!(out, "<tabletop xmlns=\"{TABLETOP_NAMESPACE}\"");
    for key in ["xspan", "yspan"] {
        if let Some(value) = scene.spans.get(key) {
            let _ = write!(out, " {key}=\"{}\"", escape(value));
        }
    }
    out.push_str(">\n");
    for element in &scene.elements {
        render_element(&mut out, element, 1);
    }
    out.push_str("</tabletop>\n");
    out
}
