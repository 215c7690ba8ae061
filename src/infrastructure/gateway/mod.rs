pub mod http;

use std::sync::Arc;

use anyhow::bail;
use anyhow::Result;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::GatewayBox;

pub struct GatewayManager {}

impl GatewayManager {
    pub fn get() -> Result<GatewayBox> {
        let url = Config::get(ConfigKey::ApiURL);
        if !url.starts_with("http://") && !url.starts_with("https://") {
            bail!(format!(
                "{key} must be an http(s) URL, got '{url}'",
                key = ConfigKey::ApiURL
            ));
        }

        return Ok(Arc::<http::HttpGateway>::default());
    }
}
