//! JuiceFS chart values as recorded in its tracking record.

use std::collections::BTreeMap;

use ddc_models::JUICEFS_ENGINE_IMPL;
use serde::{Deserialize, Serialize};

use crate::tracking::TrackedValues;

pub const MOUNT_PATH: &str = "mountpath";
pub const EDITION: &str = "edition";
pub const METAURL_SECRET: &str = "metaurlsecret";
pub const METAURL_SECRET_KEY: &str = "metaurlsecretkey";
pub const TOKEN_SECRET: &str = "tokensecret";
pub const TOKEN_SECRET_KEY: &str = "tokensecretkey";
pub const ACCESS_KEY_SECRET: &str = "accesskeysecret";
pub const ACCESS_KEY_SECRET_KEY: &str = "accesskeysecretkey";
pub const SECRET_KEY_SECRET: &str = "secretkeysecret";
pub const SECRET_KEY_SECRET_KEY: &str = "secretkeysecretkey";
pub const FORMAT_CMD: &str = "formatcmd";
pub const NAME: &str = "name";

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JuiceFsValues {
    #[serde(default)]
    pub fullname_override: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub edition: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub source: String,
    #[serde(default)]
    pub configs: JuiceFsConfigs,
    #[serde(default)]
    pub fuse: JuiceFsFuse,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct JuiceFsConfigs {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "metaurlSecret", default, skip_serializing_if = "String::is_empty")]
    pub metaurl_secret: String,
    #[serde(rename = "metaurlSecretKey", default, skip_serializing_if = "String::is_empty")]
    pub metaurl_secret_key: String,
    #[serde(rename = "tokenSecret", default, skip_serializing_if = "String::is_empty")]
    pub token_secret: String,
    #[serde(rename = "tokenSecretKey", default, skip_serializing_if = "String::is_empty")]
    pub token_secret_key: String,
    #[serde(rename = "accesskeySecret", default, skip_serializing_if = "String::is_empty")]
    pub access_key_secret: String,
    #[serde(rename = "accesskeySecretKey", default, skip_serializing_if = "String::is_empty")]
    pub access_key_secret_key: String,
    #[serde(rename = "secretkeySecret", default, skip_serializing_if = "String::is_empty")]
    pub secret_key_secret: String,
    #[serde(rename = "secretkeySecretKey", default, skip_serializing_if = "String::is_empty")]
    pub secret_key_secret_key: String,
    #[serde(rename = "formatCmd", default, skip_serializing_if = "String::is_empty")]
    pub format_cmd: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub bucket: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub storage: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JuiceFsFuse {
    #[serde(default)]
    pub mount_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl TrackedValues for JuiceFsValues {
    const ENGINE_IMPL: &'static str = JUICEFS_ENGINE_IMPL;

    fn cache_info(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            (MOUNT_PATH.to_string(), self.fuse.mount_path.clone()),
            (EDITION.to_string(), self.edition.clone()),
        ])
    }

    fn fs_info(&self) -> BTreeMap<String, String> {
        let c = &self.configs;
        [
            (METAURL_SECRET, &c.metaurl_secret),
            (METAURL_SECRET_KEY, &c.metaurl_secret_key),
            (TOKEN_SECRET, &c.token_secret),
            (TOKEN_SECRET_KEY, &c.token_secret_key),
            (ACCESS_KEY_SECRET, &c.access_key_secret),
            (ACCESS_KEY_SECRET_KEY, &c.access_key_secret_key),
            (SECRET_KEY_SECRET, &c.secret_key_secret),
            (SECRET_KEY_SECRET_KEY, &c.secret_key_secret_key),
            (FORMAT_CMD, &c.format_cmd),
            (NAME, &c.name),
            (EDITION, &self.edition),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
    }
}
