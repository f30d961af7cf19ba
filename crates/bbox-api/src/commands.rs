// Write endpoints: radios, WPS, parental control, reboot.

use reqwest::Method;
use strum::{Display, EnumIter, EnumString};
use tracing::debug;

use crate::client::{BboxClient, flag};
use crate::error::Error;

/// A wireless radio the router can switch on and off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString)]
pub enum WifiBand {
    #[strum(serialize = "24")]
    Band24,
    #[strum(serialize = "5")]
    Band5,
    #[strum(serialize = "guest")]
    Guest,
}

impl WifiBand {
    /// Key of this radio under `wireless.radio` in the read payload.
    pub fn radio_key(self) -> &'static str {
        match self {
            Self::Band24 => "24",
            Self::Band5 => "5",
            Self::Guest => "guest",
        }
    }
}

impl BboxClient {
    /// Enable or disable one wireless radio.
    pub async fn set_wireless(&self, band: WifiBand, enable: bool) -> Result<(), Error> {
        let url = self.api_url(&format!("wireless/{}", band.radio_key()))?;
        debug!(%band, enable, "setting wireless radio");
        self.send_form(Method::PUT, url, &[("radio.enable", flag(enable))])
            .await
    }

    /// Start (`true`) or stop (`false`) a WPS pairing session.
    pub async fn set_wps(&self, enable: bool) -> Result<(), Error> {
        let url = self.api_url("wps")?;
        let method = if enable { Method::POST } else { Method::DELETE };
        self.send_form(method, url, &[]).await
    }

    /// Enable or disable the parental control scheduler.
    pub async fn set_parental_control(&self, enable: bool) -> Result<(), Error> {
        let url = self.api_url("parentalcontrol")?;
        self.send_form(Method::PUT, url, &[("enable", flag(enable))])
            .await
    }

    /// Enable or disable parental control for one LAN host.
    pub async fn set_device_parental_control(
        &self,
        macaddress: &str,
        enable: bool,
    ) -> Result<(), Error> {
        let url = self.api_url("parentalcontrol/hosts")?;
        self.send_form(
            Method::PUT,
            url,
            &[("macaddress", macaddress), ("enable", flag(enable))],
        )
        .await
    }

    /// Reboot the router. Requires a fresh device token.
    pub async fn reboot(&self) -> Result<(), Error> {
        let token = self.fetch_token().await?;
        let mut url = self.api_url("device/reboot")?;
        url.query_pairs_mut().append_pair("btoken", &token);
        debug!("rebooting router");
        self.send_form(Method::POST, url, &[]).await
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn band_parses_from_radio_key() {
        assert_eq!(WifiBand::from_str("24").ok(), Some(WifiBand::Band24));
        assert_eq!(WifiBand::from_str("5").ok(), Some(WifiBand::Band5));
        assert_eq!(WifiBand::from_str("guest").ok(), Some(WifiBand::Guest));
        assert!(WifiBand::from_str("6").is_err());
    }

    #[test]
    fn band_display_matches_radio_key() {
        assert_eq!(WifiBand::Guest.to_string(), WifiBand::Guest.radio_key());
    }
}
