//! Raw inbound requests: flat string fields as sent by a form or query.

use crate::core::preload::{self, fields};
use crate::core::{
    Click, ConfirmationChoice, DialogValues, FlowArgs, Interaction, InteractionKind, Modifiers,
    RawInput,
};
use crate::errors::{HarnessError, ParameterError, ProtocolError};
use crate::flow::FlowIdentity;
use crate::registry::FlowRegistry;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A request as a flat map of string fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRequest(BTreeMap<String, String>);

impl RawRequest {
    /// Creates an empty request.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    /// Iterates over the raw fields.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Resolves the flow identity: command class, key and `arg.*` arguments.
    pub fn identity(&self) -> Result<FlowIdentity, ParameterError> {
        let class = self
            .field(fields::COMMAND_CLASS)
            .ok_or_else(|| ParameterError::missing(fields::COMMAND_CLASS))?;
        let key = self
            .field(fields::COMMAND_KEY)
            .ok_or_else(|| ParameterError::missing(fields::COMMAND_KEY))?;
        let kind = FlowRegistry::resolve(class, key)?;
        Ok(FlowIdentity::new(kind, self.args()?))
    }

    /// Collects the `arg.*` fields into a validated bundle.
    pub fn args(&self) -> Result<FlowArgs, ParameterError> {
        FlowArgs::from_pairs(
            self.0
                .iter()
                .filter_map(|(k, v)| Some((k.strip_prefix(fields::ARG_PREFIX)?, v.as_str()))),
        )
    }

    /// The echoed interaction sequence number, if any.
    pub fn seq(&self) -> Result<Option<u64>, ParameterError> {
        self.field(fields::SEQ)
            .map(|raw| {
                raw.parse().map_err(|_| {
                    ParameterError::invalid(fields::SEQ, format!("'{raw}' is not a sequence number"))
                })
            })
            .transpose()
    }

    /// Returns true if the request asks to cancel the pending interaction.
    #[must_use]
    pub fn is_cancel(&self) -> bool {
        self.flag(fields::CANCEL)
    }

    /// Reads the answer to an interaction of kind `expected`.
    ///
    /// A confirmation `choice` wins over dialog fields, which win over a
    /// click point. A request with no answer fields answers a dialog with no
    /// values; any other kind rejects it.
    pub fn answer(&self, expected: InteractionKind) -> Result<Interaction, HarnessError> {
        if let Some(raw) = self.field(fields::CHOICE) {
            let choice: ConfirmationChoice = raw
                .parse()
                .map_err(|reason: String| ParameterError::invalid(fields::CHOICE, reason))?;
            return Ok(Interaction::confirmation(choice));
        }

        let values: DialogValues = self
            .0
            .iter()
            .filter_map(|(k, v)| {
                let name = k.strip_prefix(fields::FIELD_PREFIX)?;
                Some((name.to_string(), v.trim().to_string()))
            })
            .collect();
        if !values.is_empty() {
            return Ok(Interaction::dialog(values));
        }

        if self.field(fields::X).is_some() && self.field(fields::Y).is_some() {
            let point = preload::point(self, fields::X, fields::Y)?;
            let click = Click::at(point.x, point.y)
                .in_space(preload::space(self)?)
                .with_modifiers(Modifiers {
                    shift: self.flag(fields::SHIFT),
                    ctrl: self.flag(fields::CTRL),
                    alt: self.flag(fields::ALT),
                });
            return Ok(Interaction::click(click));
        }

        if expected == InteractionKind::Dialog {
            return Ok(Interaction::dialog(DialogValues::new()));
        }
        Err(ProtocolError::MissingAnswer { expected }.into())
    }

    fn flag(&self, name: &str) -> bool {
        self.field(name).is_some_and(|raw| {
            matches!(raw.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
        })
    }
}

impl RawInput for RawRequest {
    fn field(&self, name: &str) -> Option<&str> {
        self.0.field(name)
    }
}

impl From<BTreeMap<String, String>> for RawRequest {
    fn from(fields: BTreeMap<String, String>) -> Self {
        Self(fields)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawRequest {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CoordSpace, Point};
    use crate::flow::FlowKind;
    use crate::testing::TestRequest;

    #[test]
    fn test_identity_with_args() {
        let request = TestRequest::command(FlowKind::AddNode)
            .arg("label", "Pump")
            .build();
        let identity = request.identity().unwrap();
        assert_eq!(identity.kind(), FlowKind::AddNode);
        assert_eq!(identity.args().get("label"), Some("Pump"));
    }

    #[test]
    fn test_identity_errors() {
        let missing = RawRequest::new().with("command_key", "add_node");
        assert_eq!(missing.identity().unwrap_err(), ParameterError::missing("command_class"));

        let bad_arg = TestRequest::command(FlowKind::AddNode).arg("Label", "x").build();
        assert!(matches!(
            bad_arg.identity(),
            Err(ParameterError::InvalidArgument { .. })
        ));

        let empty_arg = TestRequest::command(FlowKind::AddNode).arg("label", " ").build();
        assert!(matches!(
            empty_arg.identity(),
            Err(ParameterError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_seq() {
        assert_eq!(RawRequest::new().seq(), Ok(None));
        assert_eq!(RawRequest::new().with("seq", "7").seq(), Ok(Some(7)));
        assert!(RawRequest::new().with("seq", "-1").seq().is_err());
    }

    #[test]
    fn test_answer_shapes() {
        let choice = RawRequest::new().with("choice", "No").with("x", "1").with("y", "2");
        assert_eq!(
            choice.answer(InteractionKind::Click).unwrap(),
            Interaction::confirmation(ConfirmationChoice::No)
        );

        let dialog = RawRequest::new().with("field.label", " Pump ");
        let Interaction::Dialog { values } = dialog.answer(InteractionKind::Dialog).unwrap() else {
            panic!("expected dialog values");
        };
        assert_eq!(values.get("label").map(String::as_str), Some("Pump"));

        let click = RawRequest::new()
            .with("x", "4")
            .with("y", "8")
            .with("space", "device")
            .with("shift", "true")
            .answer(InteractionKind::Click)
            .unwrap();
        let Interaction::Click { click } = click else {
            panic!("expected a click");
        };
        assert_eq!(click.point, Point::new(4.0, 8.0));
        assert_eq!(click.space, CoordSpace::Device);
        assert!(click.modifiers.shift && !click.modifiers.ctrl);
    }

    #[test]
    fn test_empty_answer() {
        let empty = RawRequest::new();
        assert_eq!(
            empty.answer(InteractionKind::Dialog).unwrap(),
            Interaction::dialog(DialogValues::new())
        );
        assert!(matches!(
            empty.answer(InteractionKind::Click),
            Err(HarnessError::Protocol(ProtocolError::MissingAnswer { .. }))
        ));
    }

    #[test]
    fn test_bad_choice_is_parameter_error() {
        let err = RawRequest::new()
            .with("choice", "maybe")
            .answer(InteractionKind::Confirmation)
            .unwrap_err();
        assert!(matches!(err, HarnessError::Parameter(_)));
    }

    #[test]
    fn test_cancel_flag() {
        assert!(RawRequest::new().with("cancel", "TRUE").is_cancel());
        assert!(!RawRequest::new().with("cancel", "false").is_cancel());
        assert!(!RawRequest::new().is_cancel());
    }
}
