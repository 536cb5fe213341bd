//! Registry edits applied by the generated installer.
//!
//! Only the data contract lives here; the installer program performs the
//! actual writes and swallows per-entry failures.

use serde::{Deserialize, Deserializer, Serialize};

/// Windows registry root key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistryHive {
    #[serde(rename = "HKEY_CLASSES_ROOT")]
    ClassesRoot,
    #[default]
    #[serde(rename = "HKEY_CURRENT_USER")]
    CurrentUser,
    #[serde(rename = "HKEY_LOCAL_MACHINE")]
    LocalMachine,
    #[serde(rename = "HKEY_USERS")]
    Users,
    #[serde(rename = "HKEY_CURRENT_CONFIG")]
    CurrentConfig,
}

/// Registry value type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistryValueType {
    #[default]
    #[serde(rename = "REG_SZ")]
    String,
    #[serde(rename = "REG_DWORD")]
    Dword,
    #[serde(rename = "REG_BINARY")]
    Binary,
    #[serde(rename = "REG_MULTI_SZ")]
    MultiString,
    #[serde(rename = "REG_EXPAND_SZ")]
    ExpandString,
}

/// Advisory action; the generator applies every entry the same way.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistryAction {
    #[default]
    Create,
    Delete,
    Modify,
}

/// A single registry value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryEntry {
    pub hive: RegistryHive,
    /// Backslash separated key path below the hive.
    pub key: String,
    pub value_name: String,
    pub value_type: RegistryValueType,
    /// Value payload as text; numbers in older documents are kept as their decimal form.
    #[serde(deserialize_with = "string_or_number")]
    pub value_data: String,
    pub action: RegistryAction,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Integer(i64),
        Float(f64),
        Flag(bool),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Integer(n) => n.to_string(),
        Raw::Float(n) => n.to_string(),
        Raw::Flag(b) => b.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_value_data_is_accepted() {
        let entry: RegistryEntry = serde_json::from_str(
            r#"{"hive":"HKEY_LOCAL_MACHINE","key":"Software\\Demo","value_name":"Level",
                "value_type":"REG_DWORD","value_data":3,"action":"modify"}"#,
        )
        .expect("parse");

        assert_eq!(entry.hive, RegistryHive::LocalMachine);
        assert_eq!(entry.value_type, RegistryValueType::Dword);
        assert_eq!(entry.value_data, "3");
        assert_eq!(entry.action, RegistryAction::Modify);
    }

    #[test]
    fn test_hive_names_match_windows_root_keys() {
        let json = serde_json::to_string(&RegistryHive::ClassesRoot).expect("ser");
        assert_eq!(json, "\"HKEY_CLASSES_ROOT\"");
        let json = serde_json::to_string(&RegistryValueType::ExpandString).expect("ser");
        assert_eq!(json, "\"REG_EXPAND_SZ\"");
    }
}
