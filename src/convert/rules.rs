//! Per-shape converter construction
//!
//! Each rule takes the already-built actions for its component types and
//! composes them into the action for the whole type. Component actions may be
//! forward placeholders; rules only call them when converting data, never
//! while building.

use crate::convert::action::{Action, Verb};
use crate::convert::datum::Datum;
use crate::convert::hooks::RecordHooks;
use crate::error::{ConvcacheError, ConvcacheResult};
use crate::types::{RecordDef, TypeExpr, TAG_KEY};
use serde_json::{Map, Number, Value};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Short name of a JSON value's shape, for error messages
pub fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_i64() || n.is_u64() => "int",
        Value::Number(_) => "float",
        Value::String(_) => "str",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Actions for `int`, `float`, `str`, `bool` and `any`
pub fn primitive(verb: Verb, ty: &TypeExpr) -> Action {
    let ty = ty.clone();
    match verb {
        Verb::Decode => Action::decoder(move |value| decode_primitive(&ty, value)),
        Verb::Encode => Action::encoder(move |datum| encode_primitive(&ty, datum)),
        Verb::Check => Action::checker(move |value| Ok(decode_primitive(&ty, value).is_ok())),
        Verb::Inspect => Action::inspector(move |datum| Ok(encode_primitive(&ty, datum).is_ok())),
    }
}

fn decode_primitive(ty: &TypeExpr, value: &Value) -> ConvcacheResult<Datum> {
    let decoded = match (ty, value) {
        (TypeExpr::Int, Value::Number(n)) if n.is_u64() && !n.is_i64() => {
            return Err(ConvcacheError::IntOutOfRange(n.to_string()))
        }
        (TypeExpr::Int, Value::Number(n)) => n.as_i64().map(Datum::Int),
        (TypeExpr::Float, Value::Number(n)) => n.as_f64().map(Datum::Float),
        (TypeExpr::Str, Value::String(s)) => Some(Datum::Str(s.clone())),
        (TypeExpr::Bool, Value::Bool(b)) => Some(Datum::Bool(*b)),
        (TypeExpr::Any, value) => Some(Datum::Any(value.clone())),
        _ => None,
    };
    decoded.ok_or_else(|| ConvcacheError::mismatch(ty.to_string(), json_kind(value)))
}

fn encode_primitive(ty: &TypeExpr, datum: &Datum) -> ConvcacheResult<Value> {
    let encoded = match (ty, datum) {
        (TypeExpr::Int, Datum::Int(i)) => Some(Value::from(*i)),
        (TypeExpr::Float, Datum::Float(f)) => Number::from_f64(*f).map(Value::Number),
        (TypeExpr::Float, Datum::Int(i)) => Number::from_f64(*i as f64).map(Value::Number),
        (TypeExpr::Str, Datum::Str(s)) => Some(Value::String(s.clone())),
        (TypeExpr::Bool, Datum::Bool(b)) => Some(Value::Bool(*b)),
        (TypeExpr::Any, Datum::Any(value)) => Some(value.clone()),
        _ => None,
    };
    encoded.ok_or_else(|| ConvcacheError::mismatch(ty.to_string(), datum.kind()))
}

/// Homogeneous JSON arrays
pub fn list(verb: Verb, inner: Action) -> Action {
    match verb {
        Verb::Decode => Action::decoder(move |value| {
            let items = value
                .as_array()
                .ok_or_else(|| ConvcacheError::mismatch("list", json_kind(value)))?;
            items
                .iter()
                .enumerate()
                .map(|(i, item)| inner.decode(item).map_err(|e| e.at(i)))
                .collect::<ConvcacheResult<Vec<_>>>()
                .map(Datum::List)
        }),
        Verb::Encode => Action::encoder(move |datum| {
            let Datum::List(items) = datum else {
                return Err(ConvcacheError::mismatch("list", datum.kind()));
            };
            items
                .iter()
                .enumerate()
                .map(|(i, item)| inner.encode(item).map_err(|e| e.at(i)))
                .collect::<ConvcacheResult<Vec<_>>>()
                .map(Value::Array)
        }),
        Verb::Check => Action::checker(move |value| match value.as_array() {
            Some(items) => all(items, |item| inner.check(item)),
            None => Ok(false),
        }),
        Verb::Inspect => Action::inspector(move |datum| match datum {
            Datum::List(items) => all(items, |item| inner.inspect(item)),
            _ => Ok(false),
        }),
    }
}

/// `null` or the inner type
pub fn optional(verb: Verb, inner: Action) -> Action {
    match verb {
        Verb::Decode => Action::decoder(move |value| match value {
            Value::Null => Ok(Datum::Null),
            value => inner.decode(value),
        }),
        Verb::Encode => Action::encoder(move |datum| match datum {
            Datum::Null => Ok(Value::Null),
            datum => inner.encode(datum),
        }),
        Verb::Check => Action::checker(move |value| match value {
            Value::Null => Ok(true),
            value => inner.check(value),
        }),
        Verb::Inspect => Action::inspector(move |datum| match datum {
            Datum::Null => Ok(true),
            datum => inner.inspect(datum),
        }),
    }
}

/// Fixed-length heterogeneous JSON arrays
pub fn tuple(verb: Verb, items: Vec<Action>) -> Action {
    let items: Arc<[Action]> = items.into();
    match verb {
        Verb::Decode => Action::decoder(move |value| {
            let values = value
                .as_array()
                .ok_or_else(|| ConvcacheError::mismatch("tuple", json_kind(value)))?;
            check_length(items.len(), values.len())?;
            items
                .iter()
                .zip(values)
                .enumerate()
                .map(|(i, (action, item))| action.decode(item).map_err(|e| e.at(i)))
                .collect::<ConvcacheResult<Vec<_>>>()
                .map(Datum::Tuple)
        }),
        Verb::Encode => Action::encoder(move |datum| {
            let Datum::Tuple(values) = datum else {
                return Err(ConvcacheError::mismatch("tuple", datum.kind()));
            };
            check_length(items.len(), values.len())?;
            items
                .iter()
                .zip(values)
                .enumerate()
                .map(|(i, (action, item))| action.encode(item).map_err(|e| e.at(i)))
                .collect::<ConvcacheResult<Vec<_>>>()
                .map(Value::Array)
        }),
        Verb::Check => Action::checker(move |value| match value.as_array() {
            Some(values) if values.len() == items.len() => {
                all(items.iter().zip(values), |(action, item)| action.check(item))
            }
            _ => Ok(false),
        }),
        Verb::Inspect => Action::inspector(move |datum| match datum {
            Datum::Tuple(values) if values.len() == items.len() => {
                all(items.iter().zip(values), |(action, item)| action.inspect(item))
            }
            _ => Ok(false),
        }),
    }
}

/// A record field paired with the action for its type
pub struct FieldAction {
    pub name: String,
    pub default: Option<Value>,
    pub action: Action,
}

struct RecordShape {
    name: String,
    tag: Option<String>,
    positional: bool,
    fields: Vec<FieldAction>,
    hooks: RecordHooks,
}

/// JSON objects with named fields
pub fn record(
    verb: Verb,
    def: &RecordDef,
    fields: Vec<FieldAction>,
    hooks: Option<&RecordHooks>,
) -> Action {
    let shape = Arc::new(RecordShape {
        name: def.name.clone(),
        tag: def.tag.clone(),
        positional: def.positional,
        fields,
        hooks: hooks.cloned().unwrap_or_default(),
    });
    let check_override = shape.hooks.check.clone();
    match verb {
        Verb::Decode => Action::decoder(move |value| shape.decode(value)),
        Verb::Encode => Action::encoder(move |datum| shape.encode(datum)),
        Verb::Check => match check_override {
            Some(check) => Action::Check(check),
            None => Action::checker(move |value| shape.check(value)),
        },
        Verb::Inspect => Action::inspector(move |datum| shape.inspect(datum)),
    }
}

impl RecordShape {
    /// Apply the pre-decode hook, if any
    fn prepare<'v>(&self, value: &'v Value) -> ConvcacheResult<Cow<'v, Value>> {
        match &self.hooks.pre_decode {
            Some(hook) => hook(value).map(Cow::Owned),
            None => Ok(Cow::Borrowed(value)),
        }
    }

    /// Accept the positional array form where allowed
    fn object<'v>(&self, value: &'v Value) -> Option<Cow<'v, Map<String, Value>>> {
        match value {
            Value::Object(map) => Some(Cow::Borrowed(map)),
            Value::Array(items) if self.positional && items.len() <= self.fields.len() => {
                Some(Cow::Owned(
                    self.fields
                        .iter()
                        .zip(items)
                        .map(|(field, item)| (field.name.clone(), item.clone()))
                        .collect(),
                ))
            }
            _ => None,
        }
    }

    fn decode(&self, value: &Value) -> ConvcacheResult<Datum> {
        let value = self.prepare(value)?;
        let map = self.object(&value).ok_or_else(|| {
            ConvcacheError::mismatch(format!("record {}", self.name), json_kind(&value))
        })?;

        let mut fields = BTreeMap::new();
        for field in &self.fields {
            let datum = match (map.get(&field.name), &field.default) {
                (Some(item), _) => field.action.decode(item).map_err(|e| e.at(&field.name))?,
                (None, Some(default)) => {
                    field
                        .action
                        .decode(default)
                        .map_err(|e| ConvcacheError::InvalidDefault {
                            record: self.name.clone(),
                            field: field.name.clone(),
                            reason: e.to_string(),
                        })?
                }
                (None, None) => {
                    return Err(ConvcacheError::MissingField {
                        record: self.name.clone(),
                        field: field.name.clone(),
                    })
                }
            };
            fields.insert(field.name.clone(), datum);
        }

        Ok(Datum::Record {
            name: self.name.clone(),
            fields,
        })
    }

    fn encode(&self, datum: &Datum) -> ConvcacheResult<Value> {
        let values = match datum {
            Datum::Record { name, fields } if *name == self.name => fields,
            other => {
                return Err(ConvcacheError::mismatch(
                    format!("record {}", self.name),
                    other.kind(),
                ))
            }
        };

        let mut map = Map::new();
        for field in &self.fields {
            let Some(value) = values.get(&field.name) else {
                if field.default.is_some() {
                    continue;
                }
                return Err(ConvcacheError::MissingField {
                    record: self.name.clone(),
                    field: field.name.clone(),
                });
            };

            let encoded = field.action.encode(value).map_err(|e| e.at(&field.name))?;
            // Values equal to their default are left implicit
            if field.default.as_ref() == Some(&encoded) {
                continue;
            }
            map.insert(field.name.clone(), encoded);
        }

        if let Some(tag) = &self.tag {
            map.insert(TAG_KEY.to_string(), Value::String(tag.clone()));
        }

        let encoded = Value::Object(map);
        match &self.hooks.post_encode {
            Some(hook) => hook(encoded),
            None => Ok(encoded),
        }
    }

    fn check(&self, value: &Value) -> ConvcacheResult<bool> {
        let Ok(value) = self.prepare(value) else {
            return Ok(false);
        };

        if let Some(tag) = &self.tag {
            if value.get(TAG_KEY).and_then(Value::as_str) != Some(tag.as_str()) {
                return Ok(false);
            }
        }

        let Some(map) = self.object(&value) else {
            return Ok(false);
        };

        all(&self.fields, |field| match map.get(&field.name) {
            Some(item) => field.action.check(item),
            None => Ok(field.default.is_some()),
        })
    }

    fn inspect(&self, datum: &Datum) -> ConvcacheResult<bool> {
        let Datum::Record { name, fields } = datum else {
            return Ok(false);
        };
        if *name != self.name {
            return Ok(false);
        }

        all(&self.fields, |field| match fields.get(&field.name) {
            Some(value) => field.action.inspect(value),
            None => Ok(field.default.is_some()),
        })
    }
}

/// Whether `test` holds for every item, stopping at the first failure
fn all<I: IntoIterator>(
    items: I,
    mut test: impl FnMut(I::Item) -> ConvcacheResult<bool>,
) -> ConvcacheResult<bool> {
    for item in items {
        if !test(item)? {
            return Ok(false);
        }
    }
    Ok(true)
}

fn check_length(expected: usize, found: usize) -> ConvcacheResult<()> {
    if expected == found {
        Ok(())
    } else {
        Err(ConvcacheError::TupleLength { expected, found })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::hooks::PreDecodeFn;
    use crate::types::FieldDef;
    use serde_json::json;

    fn int(verb: Verb) -> Action {
        primitive(verb, &TypeExpr::Int)
    }

    fn point(positional: bool, tag: Option<&str>) -> RecordDef {
        RecordDef {
            name: "Point".to_string(),
            tag: tag.map(str::to_string),
            positional,
            fields: vec![
                FieldDef {
                    name: "x".to_string(),
                    ty: TypeExpr::Int,
                    default: None,
                },
                FieldDef {
                    name: "y".to_string(),
                    ty: TypeExpr::Int,
                    default: Some(json!(0)),
                },
            ],
        }
    }

    fn point_action(verb: Verb, def: &RecordDef) -> Action {
        hooked_point_action(verb, def, None)
    }

    fn hooked_point_action(verb: Verb, def: &RecordDef, hooks: Option<&RecordHooks>) -> Action {
        let fields = def
            .fields
            .iter()
            .map(|field| FieldAction {
                name: field.name.clone(),
                default: field.default.clone(),
                action: int(verb),
            })
            .collect();
        record(verb, def, fields, hooks)
    }

    #[test]
    fn primitives_decode() {
        assert_eq!(int(Verb::Decode).decode(&json!(3)).unwrap(), Datum::Int(3));
        assert!(int(Verb::Decode).decode(&json!(3.5)).is_err());
        assert_eq!(
            primitive(Verb::Decode, &TypeExpr::Float)
                .decode(&json!(3))
                .unwrap(),
            Datum::Float(3.0)
        );
        let err = primitive(Verb::Decode, &TypeExpr::Str)
            .decode(&json!(true))
            .unwrap_err();
        assert_eq!(err.to_string(), "Expected str, found bool");
    }

    #[test]
    fn oversized_int_reported_as_out_of_range() {
        let big = json!(u64::MAX);
        let err = int(Verb::Decode).decode(&big).unwrap_err();
        assert!(matches!(err, ConvcacheError::IntOutOfRange(_)));
        assert_eq!(
            err.to_string(),
            "Integer 18446744073709551615 is out of range for int"
        );
        assert!(!int(Verb::Check).check(&big).unwrap());

        // Still a valid float
        assert!(primitive(Verb::Decode, &TypeExpr::Float).decode(&big).is_ok());
    }

    #[test]
    fn primitives_inspect() {
        let inspect = int(Verb::Inspect);
        assert!(inspect.inspect(&Datum::Int(1)).unwrap());
        assert!(!inspect.inspect(&Datum::from("1")).unwrap());

        let float = primitive(Verb::Inspect, &TypeExpr::Float);
        assert!(float.inspect(&Datum::Int(2)).unwrap());
        assert!(!float.inspect(&Datum::Float(f64::INFINITY)).unwrap());
        assert!(primitive(Verb::Inspect, &TypeExpr::Any)
            .inspect(&Datum::Any(json!([1])))
            .unwrap());
    }

    #[test]
    fn containers_inspect() {
        let list_of_ints = list(Verb::Inspect, int(Verb::Inspect));
        assert!(list_of_ints
            .inspect(&Datum::List(vec![Datum::Int(1), Datum::Int(2)]))
            .unwrap());
        assert!(!list_of_ints
            .inspect(&Datum::List(vec![Datum::Int(1), Datum::Null]))
            .unwrap());
        assert!(!list_of_ints.inspect(&Datum::Tuple(vec![])).unwrap());

        let maybe = optional(Verb::Inspect, int(Verb::Inspect));
        assert!(maybe.inspect(&Datum::Null).unwrap());
        assert!(!maybe.inspect(&Datum::Bool(true)).unwrap());

        let pair = tuple(
            Verb::Inspect,
            vec![int(Verb::Inspect), primitive(Verb::Inspect, &TypeExpr::Str)],
        );
        assert!(pair
            .inspect(&Datum::Tuple(vec![Datum::Int(1), Datum::from("a")]))
            .unwrap());
        assert!(!pair.inspect(&Datum::Tuple(vec![Datum::Int(1)])).unwrap());
    }

    #[test]
    fn primitives_encode() {
        assert_eq!(int(Verb::Encode).encode(&Datum::Int(4)).unwrap(), json!(4));
        assert!(primitive(Verb::Encode, &TypeExpr::Float)
            .encode(&Datum::Float(f64::NAN))
            .is_err());
        assert_eq!(
            primitive(Verb::Encode, &TypeExpr::Any)
                .encode(&Datum::Any(json!({"k": [1]})))
                .unwrap(),
            json!({"k": [1]})
        );
    }

    #[test]
    fn primitives_check() {
        let check = primitive(Verb::Check, &TypeExpr::Bool);
        assert!(check.check(&json!(false)).unwrap());
        assert!(!check.check(&json!("false")).unwrap());
        assert!(primitive(Verb::Check, &TypeExpr::Any)
            .check(&Value::Null)
            .unwrap());
    }

    #[test]
    fn list_errors_carry_index() {
        let decode = list(Verb::Decode, int(Verb::Decode));
        assert_eq!(
            decode.decode(&json!([1, 2])).unwrap(),
            Datum::List(vec![Datum::Int(1), Datum::Int(2)])
        );
        let err = decode.decode(&json!([1, "two"])).unwrap_err();
        assert_eq!(err.to_string(), "Invalid value at 1: Expected int, found str");

        let check = list(Verb::Check, int(Verb::Check));
        assert!(check.check(&json!([])).unwrap());
        assert!(!check.check(&json!([1, null])).unwrap());
        assert!(!check.check(&json!({})).unwrap());
    }

    #[test]
    fn optional_null() {
        let decode = optional(Verb::Decode, int(Verb::Decode));
        assert_eq!(decode.decode(&Value::Null).unwrap(), Datum::Null);
        assert_eq!(decode.decode(&json!(1)).unwrap(), Datum::Int(1));

        let encode = optional(Verb::Encode, int(Verb::Encode));
        assert_eq!(encode.encode(&Datum::Null).unwrap(), Value::Null);
    }

    #[test]
    fn tuple_length_enforced() {
        let decode = tuple(
            Verb::Decode,
            vec![int(Verb::Decode), primitive(Verb::Decode, &TypeExpr::Str)],
        );
        assert_eq!(
            decode.decode(&json!([1, "a"])).unwrap(),
            Datum::Tuple(vec![Datum::Int(1), Datum::from("a")])
        );
        let err = decode.decode(&json!([1])).unwrap_err();
        assert!(matches!(
            err,
            ConvcacheError::TupleLength {
                expected: 2,
                found: 1
            }
        ));

        let check = tuple(Verb::Check, vec![int(Verb::Check)]);
        assert!(check.check(&json!([1])).unwrap());
        assert!(!check.check(&json!([1, 2])).unwrap());
    }

    #[test]
    fn record_decode_fills_defaults() {
        let def = point(false, None);
        let decode = point_action(Verb::Decode, &def);

        let datum = decode.decode(&json!({"x": 1, "extra": true})).unwrap();
        assert_eq!(
            datum,
            Datum::record("Point", [("x", Datum::Int(1)), ("y", Datum::Int(0))])
        );

        let err = decode.decode(&json!({"y": 1})).unwrap_err();
        assert_eq!(err.to_string(), "Missing required field Point.x");

        let err = decode.decode(&json!({"x": "1"})).unwrap_err();
        assert_eq!(err.to_string(), "Invalid value at x: Expected int, found str");

        assert!(decode.decode(&json!([1, 2])).is_err());
    }

    #[test]
    fn record_positional_form() {
        let def = point(true, None);
        let decode = point_action(Verb::Decode, &def);
        assert_eq!(
            decode.decode(&json!([5])).unwrap(),
            Datum::record("Point", [("x", Datum::Int(5)), ("y", Datum::Int(0))])
        );
        assert!(decode.decode(&json!([1, 2, 3])).is_err());

        let check = point_action(Verb::Check, &def);
        assert!(check.check(&json!([1, 2])).unwrap());
    }

    #[test]
    fn record_encode_omits_defaults_and_tags() {
        let def = point(false, Some("Pt"));
        let encode = point_action(Verb::Encode, &def);

        let value = encode
            .encode(&Datum::record("Point", [("x", Datum::Int(1)), ("y", Datum::Int(0))]))
            .unwrap();
        assert_eq!(value, json!({"x": 1, "_type_": "Pt"}));

        let value = encode
            .encode(&Datum::record("Point", [("x", Datum::Int(1)), ("y", Datum::Int(2))]))
            .unwrap();
        assert_eq!(value, json!({"x": 1, "y": 2, "_type_": "Pt"}));

        let err = encode
            .encode(&Datum::record("Other", [("x", Datum::Int(1))]))
            .unwrap_err();
        assert!(matches!(err, ConvcacheError::Mismatch { .. }));
    }

    #[test]
    fn record_check_requires_tag() {
        let def = point(false, Some("Pt"));
        let check = point_action(Verb::Check, &def);
        assert!(check.check(&json!({"x": 1, "_type_": "Pt"})).unwrap());
        assert!(!check.check(&json!({"x": 1})).unwrap());
        assert!(!check.check(&json!({"_type_": "Pt"})).unwrap());
        assert!(!check.check(&json!({"x": 1, "_type_": "Other"})).unwrap());
    }

    #[test]
    fn record_inspect() {
        let def = point(false, Some("Pt"));
        let inspect = point_action(Verb::Inspect, &def);

        assert!(inspect
            .inspect(&Datum::record("Point", [("x", Datum::Int(1))]))
            .unwrap());
        assert!(inspect
            .inspect(&Datum::record(
                "Point",
                [("x", Datum::Int(1)), ("y", Datum::Int(2)), ("z", Datum::Null)]
            ))
            .unwrap());
        assert!(!inspect
            .inspect(&Datum::record("Point", [("y", Datum::Int(1))]))
            .unwrap());
        assert!(!inspect
            .inspect(&Datum::record("Point", [("x", Datum::from("1"))]))
            .unwrap());
        assert!(!inspect
            .inspect(&Datum::record("Other", [("x", Datum::Int(1))]))
            .unwrap());
        assert!(!inspect.inspect(&Datum::Int(1)).unwrap());
    }

    #[test]
    fn pre_decode_hook_feeds_decode_and_check() {
        // Older documents spelled the field "X"
        let upgrade: Arc<PreDecodeFn> = Arc::new(|value: &Value| -> ConvcacheResult<Value> {
            let mut value = value.clone();
            if let Some(map) = value.as_object_mut() {
                if let Some(x) = map.remove("X") {
                    map.insert("x".to_string(), x);
                }
            }
            Ok(value)
        });
        let hooks = RecordHooks {
            pre_decode: Some(upgrade),
            ..RecordHooks::default()
        };
        let def = point(false, None);

        let decode = hooked_point_action(Verb::Decode, &def, Some(&hooks));
        assert_eq!(
            decode.decode(&json!({"X": 3})).unwrap(),
            Datum::record("Point", [("x", Datum::Int(3)), ("y", Datum::Int(0))])
        );

        let check = hooked_point_action(Verb::Check, &def, Some(&hooks));
        assert!(check.check(&json!({"X": 3})).unwrap());
        assert!(!check.check(&json!({"Y": 3})).unwrap());
    }

    #[test]
    fn failing_pre_decode_hook() {
        let hooks = RecordHooks {
            pre_decode: Some(Arc::new(|_: &Value| -> ConvcacheResult<Value> {
                Err(ConvcacheError::User("unsupported layout".to_string()))
            })),
            ..RecordHooks::default()
        };
        let def = point(false, None);

        let err = hooked_point_action(Verb::Decode, &def, Some(&hooks))
            .decode(&json!({"x": 1}))
            .unwrap_err();
        assert_eq!(err.to_string(), "unsupported layout");
        assert!(!hooked_point_action(Verb::Check, &def, Some(&hooks))
            .check(&json!({"x": 1}))
            .unwrap());
    }

    #[test]
    fn post_encode_hook_sees_tagged_object() {
        let hooks = RecordHooks {
            post_encode: Some(Arc::new(|mut value: Value| -> ConvcacheResult<Value> {
                if let Some(map) = value.as_object_mut() {
                    map.insert("version".to_string(), json!(2));
                }
                Ok(value)
            })),
            ..RecordHooks::default()
        };
        let def = point(false, Some("Pt"));
        let encode = hooked_point_action(Verb::Encode, &def, Some(&hooks));

        let value = encode
            .encode(&Datum::record("Point", [("x", Datum::Int(1))]))
            .unwrap();
        assert_eq!(value, json!({"x": 1, "_type_": "Pt", "version": 2}));
    }

    #[test]
    fn check_hook_replaces_generated_check() {
        let hooks = RecordHooks {
            check: Some(Arc::new(|value: &Value| -> ConvcacheResult<bool> {
                Ok(value.is_string())
            })),
            ..RecordHooks::default()
        };
        let def = point(false, None);
        let check = hooked_point_action(Verb::Check, &def, Some(&hooks));

        assert!(check.check(&json!("1,2")).unwrap());
        assert!(!check.check(&json!({"x": 1})).unwrap());
    }

    #[test]
    fn invalid_default_reported() {
        let mut def = point(false, None);
        def.fields[1].default = Some(json!("zero"));
        let decode = point_action(Verb::Decode, &def);

        let err = decode.decode(&json!({"x": 1})).unwrap_err();
        assert!(matches!(err, ConvcacheError::InvalidDefault { .. }));
    }
}
