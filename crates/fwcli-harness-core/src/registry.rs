// crates/fwcli-harness-core/src/registry.rs
// ============================================================================
// Module: Operation Registry
// Description: Typed operation descriptors rendered into CLI command strings.
// Purpose: Replace hand-assembled command text with schema-checked rendering.
// Dependencies: serde, thiserror, crate::command
// ============================================================================

//! ## Overview
//! Each firewall CLI operation is described once by an
//! [`OperationDescriptor`]: the base command plus an ordered parameter
//! schema. [`OperationDescriptor::render`] turns a [`CommandArgs`] set into a
//! [`Command`]: parameters are emitted in schema order, flags only when true,
//! and text values are quoted with [`quote_if_needed`]. Unknown arguments and
//! missing required parameters fail closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::command::ArgValue;
use crate::command::Command;
use crate::command::CommandArgs;
use crate::command::quote_if_needed;

// ============================================================================
// SECTION: Schema Types
// ============================================================================

/// Value kind accepted by a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
    /// Free text, quoted on render when needed.
    Text,
    /// Integer.
    Number,
    /// Bare switch emitted only when true.
    Flag,
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Flag => "flag",
        })
    }
}

/// One parameter in an operation schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParamSpec {
    /// Argument key used by callers.
    pub name: String,
    /// Switch emitted on the command line, e.g. `-name`.
    pub cli_name: String,
    /// Accepted value kind.
    pub kind: ParamKind,
    /// Whether the argument must be supplied.
    pub required: bool,
    /// Value used when the caller omits the argument.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<ArgValue>,
}

impl ParamSpec {
    /// Creates a parameter with no default.
    #[must_use]
    pub fn new(name: impl Into<String>, cli_name: impl Into<String>, kind: ParamKind, required: bool) -> Self {
        Self {
            name: name.into(),
            cli_name: cli_name.into(),
            kind,
            required,
            default: None,
        }
    }

    /// Required text parameter whose switch is `-<name>`.
    #[must_use]
    pub fn required_text(name: &str) -> Self {
        Self::new(name, format!("-{name}"), ParamKind::Text, true)
    }

    /// Optional text parameter whose switch is `-<name>`.
    #[must_use]
    pub fn optional_text(name: &str) -> Self {
        Self::new(name, format!("-{name}"), ParamKind::Text, false)
    }

    /// Attaches a default value.
    #[must_use]
    pub fn with_default(mut self, value: impl Into<ArgValue>) -> Self {
        self.default = Some(value.into());
        self
    }
}

/// Typed description of one CLI operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationDescriptor {
    /// Stable operation name, e.g. `host_add`.
    pub name: String,
    /// CLI verb, e.g. `addHost`.
    pub base_command: String,
    /// Ordered parameter schema.
    pub params: Vec<ParamSpec>,
}

impl OperationDescriptor {
    /// Creates a descriptor.
    #[must_use]
    pub fn new(name: impl Into<String>, base_command: impl Into<String>, params: Vec<ParamSpec>) -> Self {
        Self {
            name: name.into(),
            base_command: base_command.into(),
            params,
        }
    }

    /// Returns the parameter named `name`.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&ParamSpec> {
        self.params.iter().find(|param| param.name == name)
    }

    /// Renders the command string for `args`.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] for unknown arguments, missing required
    /// parameters, or values that do not fit the parameter kind.
    pub fn render(&self, args: &CommandArgs) -> Result<Command, RenderError> {
        if let Some(unknown) = args.keys().find(|key| self.param(key).is_none()) {
            return Err(RenderError::UnknownArgument {
                operation: self.name.clone(),
                argument: unknown.to_string(),
            });
        }
        let mut text = self.base_command.clone();
        for param in &self.params {
            let Some(value) = args.get(&param.name).or(param.default.as_ref()) else {
                if param.required {
                    return Err(RenderError::MissingRequired {
                        operation: self.name.clone(),
                        param: param.name.clone(),
                    });
                }
                continue;
            };
            if let Some(rendered) = self.render_value(param, value)? {
                text.push(' ');
                text.push_str(&param.cli_name);
                if !rendered.is_empty() {
                    text.push(' ');
                    text.push_str(&rendered);
                }
            }
        }
        Ok(Command::new(text))
    }

    /// Renders one value; `None` omits the switch entirely.
    fn render_value(&self, param: &ParamSpec, value: &ArgValue) -> Result<Option<String>, RenderError> {
        let mismatch = || RenderError::KindMismatch {
            operation: self.name.clone(),
            param: param.name.clone(),
            expected: param.kind,
        };
        match (param.kind, value) {
            (ParamKind::Flag, ArgValue::Flag(enabled)) => Ok(enabled.then(String::new)),
            (ParamKind::Flag, ArgValue::Text(raw)) => match raw.to_ascii_lowercase().as_str() {
                "true" => Ok(Some(String::new())),
                "false" => Ok(None),
                _ => Err(mismatch()),
            },
            (ParamKind::Number, ArgValue::Number(number)) => Ok(Some(number.to_string())),
            (ParamKind::Number, ArgValue::Text(raw)) => {
                raw.trim().parse::<i64>().map(|number| Some(number.to_string())).map_err(|_| mismatch())
            }
            (ParamKind::Text, ArgValue::Text(raw)) => Ok(Some(quote_if_needed(raw))),
            (ParamKind::Text, ArgValue::Number(number)) => Ok(Some(number.to_string())),
            (ParamKind::Text, ArgValue::Flag(enabled)) => Ok(Some(enabled.to_string())),
            (ParamKind::Flag | ParamKind::Number, _) => Err(mismatch()),
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while rendering an operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// A required parameter was not supplied and has no default.
    #[error("missing required parameter `{param}` for operation `{operation}`")]
    MissingRequired {
        /// Operation name.
        operation: String,
        /// Parameter name.
        param: String,
    },
    /// An argument does not belong to the operation schema.
    #[error("unknown argument `{argument}` for operation `{operation}`")]
    UnknownArgument {
        /// Operation name.
        operation: String,
        /// Argument key.
        argument: String,
    },
    /// A value does not fit the parameter kind.
    #[error("parameter `{param}` of operation `{operation}` expects a {expected} value")]
    KindMismatch {
        /// Operation name.
        operation: String,
        /// Parameter name.
        param: String,
        /// Expected kind.
        expected: ParamKind,
    },
}

/// Registry lookup and registration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// An operation with the same name is already registered.
    #[error("operation `{0}` is already registered")]
    Duplicate(String),
    /// No operation with the given name exists.
    #[error("unknown operation `{0}`")]
    UnknownOperation(String),
    /// Rendering failed.
    #[error(transparent)]
    Render(#[from] RenderError),
}

// ============================================================================
// SECTION: Registry
// ============================================================================

/// Name-indexed catalog of operation descriptors.
#[derive(Debug, Clone, Default)]
pub struct OperationRegistry {
    /// Descriptors keyed by operation name.
    operations: BTreeMap<String, OperationDescriptor>,
}

impl OperationRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            operations: BTreeMap::new(),
        }
    }

    /// Creates a registry holding the built-in operation catalog.
    #[must_use]
    pub fn builtin() -> Self {
        let operations =
            builtin_operations().into_iter().map(|op| (op.name.clone(), op)).collect();
        Self {
            operations,
        }
    }

    /// Adds a descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Duplicate`] when the name is already taken.
    pub fn register(&mut self, descriptor: OperationDescriptor) -> Result<(), RegistryError> {
        if self.operations.contains_key(&descriptor.name) {
            return Err(RegistryError::Duplicate(descriptor.name));
        }
        self.operations.insert(descriptor.name.clone(), descriptor);
        Ok(())
    }

    /// Returns the descriptor named `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&OperationDescriptor> {
        self.operations.get(name)
    }

    /// Looks up and renders an operation.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownOperation`] or a wrapped
    /// [`RenderError`].
    pub fn render(&self, name: &str, args: &CommandArgs) -> Result<Command, RegistryError> {
        let descriptor =
            self.get(name).ok_or_else(|| RegistryError::UnknownOperation(name.to_string()))?;
        Ok(descriptor.render(args)?)
    }

    /// Iterates descriptors in name order.
    pub fn iter(&self) -> impl Iterator<Item = &OperationDescriptor> {
        self.operations.values()
    }

    /// Returns the number of registered operations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Returns true when no operations are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

// ============================================================================
// SECTION: Built-in Catalog
// ============================================================================

/// Text parameters shared by host add and update.
const HOST_ADDRESS_PARAMS: &[&str] = &[
    "host",
    "netIPv4",
    "netMaskV4",
    "netIPv6",
    "startIPv4",
    "endIPv4",
    "startIPv6",
    "endIPv6",
];

/// Optional text parameters shared by DS user add and update.
const DS_USER_PARAMS: &[&str] = &[
    "email",
    "enableADAuth",
    "allowLogin",
    "twoFactorAuth",
    "whiteHosts",
    "whiteGroups",
    "blackHosts",
    "blackGroups",
];

/// Builds a descriptor from required and optional text parameter names.
fn text_op(name: &str, base: &str, required: &[&str], optional: &[&str]) -> OperationDescriptor {
    let params = required
        .iter()
        .map(|param| ParamSpec::required_text(param))
        .chain(optional.iter().map(|param| ParamSpec::optional_text(param)))
        .collect();
    OperationDescriptor::new(name, base, params)
}

/// Core lifecycle operation with the confirmation switch defaulted on.
fn core_op(name: &str, base: &str) -> OperationDescriptor {
    OperationDescriptor::new(
        name,
        base,
        vec![
            ParamSpec::new("force", "-f", ParamKind::Flag, false).with_default(true),
            ParamSpec::optional_text("dsServer"),
            ParamSpec::optional_text("worker"),
        ],
    )
}

/// Returns the built-in operation catalog.
fn builtin_operations() -> Vec<OperationDescriptor> {
    let ds_user_update_optional = [&["role"][..], DS_USER_PARAMS].concat();
    vec![
        // application
        text_op("application_add", "addApplication", &["name"], &[]),
        text_op("application_update", "updateApplication", &["name", "newName"], &[]),
        text_op("application_show_all", "showApplications", &[], &[]),
        text_op("application_show_one", "showApplication", &["name"], &[]),
        text_op("application_delete", "delApplication", &["name"], &[]),
        // host
        text_op("host_add", "addHost", &["name"], HOST_ADDRESS_PARAMS),
        text_op("host_update", "updateHost", &["name"], HOST_ADDRESS_PARAMS),
        text_op("host_show_all", "showHosts", &[], &[]),
        text_op("host_show_one", "showHost", &["name"], &[]),
        text_op("host_delete", "delHost", &["name"], &[]),
        // host group
        text_op("host_group_add", "addHostGr", &["name"], &["addMembers"]),
        text_op(
            "host_group_update",
            "updateHostGr",
            &["name"],
            &["newName", "addMembers", "removeMembers"],
        ),
        text_op("host_group_show_all", "showHostGroups", &[], &[]),
        text_op("host_group_show_one", "showHostGr", &["name"], &[]),
        text_op("host_group_delete", "delHostGr", &["name"], &[]),
        // cef
        text_op("cef_group_add", "addCefGroup", &["name"], &["enable"]),
        text_op("cef_group_update", "updateCefGroup", &["name"], &["newName", "enable"]),
        text_op("cef_group_show_all", "showCefGroups", &[], &[]),
        text_op("cef_group_show_one", "showCefGroup", &["name"], &[]),
        text_op("cef_group_delete", "delCefGroup", &["name"], &[]),
        OperationDescriptor::new(
            "cef_item_add",
            "addCefItem",
            vec![
                ParamSpec::required_text("name"),
                ParamSpec::required_text("groupName"),
                ParamSpec::required_text("type").with_default("Session Open"),
                ParamSpec::required_text("cef"),
                ParamSpec::optional_text("enable"),
            ],
        ),
        text_op(
            "cef_item_update",
            "updateCefItem",
            &["name", "groupName"],
            &["newName", "type", "cef", "enable"],
        ),
        text_op("cef_item_show_all", "showCefItems", &["groupName"], &[]),
        text_op("cef_item_show_one", "showCefItem", &["name", "groupName"], &[]),
        text_op("cef_item_delete", "delCefItem", &["name", "groupName"], &[]),
        // tag
        text_op("tag_add", "addTag", &["name", "entityType", "entityName"], &["value"]),
        text_op(
            "tag_update",
            "updateTag",
            &["name"],
            &["newName", "entityType", "entityName", "value"],
        ),
        text_op("tag_show_all", "showTags", &["entityType", "entityName"], &[]),
        text_op("tag_show_one", "showTag", &["name", "entityType", "entityName"], &[]),
        text_op("tag_show_tagged", "showTagged", &[], &["name", "value"]),
        text_op("tag_show_untagged", "showUntagged", &[], &["name"]),
        text_op("tag_delete", "delTag", &["name", "entityType", "entityName"], &[]),
        // ds user
        text_op("ds_user_add", "addDSUser", &["login", "password", "role"], DS_USER_PARAMS),
        text_op("ds_user_update", "updateDSUser", &["login"], &ds_user_update_optional),
        text_op("ds_user_show_all", "showDsUsers", &[], &[]),
        text_op("ds_user_show_one", "showDsUser", &["login"], &[]),
        text_op("ds_user_change_password", "changePwd", &["login", "currentPwd", "newPwd"], &[]),
        text_op("ds_user_delete", "delDSUser", &["login"], &[]),
        // core
        core_op("core_start", "start"),
        core_op("core_restart", "restart"),
        core_op("core_stop", "stop"),
        text_op("core_show_state", "showCoreState", &["worker"], &["dsServer"]),
        // server
        text_op("server_show_all", "showServers", &[], &[]),
        OperationDescriptor::new(
            "server_show_one",
            "showServer",
            vec![
                ParamSpec::optional_text("name"),
                ParamSpec::new("id", "-id", ParamKind::Number, false),
            ],
        ),
        OperationDescriptor::new(
            "server_delete",
            "delServer",
            vec![
                ParamSpec::optional_text("name"),
                ParamSpec::new("id", "-id", ParamKind::Number, false),
            ],
        ),
    ]
}

// ============================================================================
// SECTION: Tests
// ============================================================================
