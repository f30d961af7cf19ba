// Session authentication
//
// The router hands out a session cookie on a successful form login.
// The cookie jar configured on `BboxClient` keeps it for every later
// call; there is no explicit token to thread through requests.

use reqwest::{Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::client::{BboxClient, check_status};
use crate::error::Error;

impl BboxClient {
    /// Open a session with the administration password.
    ///
    /// A 401 means the password was refused and maps to
    /// [`Error::Authentication`]. Any other failure status maps the same
    /// way as on every other call.
    pub async fn login(&self, password: &SecretString) -> Result<(), Error> {
        let url = self.api_url("login")?;
        debug!("logging in at {}", url);

        let form = [("password", password.expose_secret()), ("remember", "1")];
        let resp = self.http().post(url).form(&form).send().await?;

        if resp.status() == StatusCode::UNAUTHORIZED {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Authentication {
                message: format!("password refused: {body}"),
            });
        }
        check_status(resp).await?;

        debug!("login successful");
        Ok(())
    }

    /// Close the session. The router forgets the cookie.
    pub async fn logout(&self) -> Result<(), Error> {
        let url = self.api_url("logout")?;
        self.send_form(Method::POST, url, &[]).await
    }

    /// Fetch the one-shot token that guards destructive operations.
    ///
    /// The body looks like `[{"device": {"token": "..."}}]`.
    pub(crate) async fn fetch_token(&self) -> Result<String, Error> {
        let url = self.api_url("device/token")?;
        let body = self.get(url).await?;

        body.get(0)
            .and_then(|fragment| fragment.get("device"))
            .and_then(|device| device.get("token"))
            .and_then(|token| token.as_str())
            .map(str::to_owned)
            .ok_or_else(|| Error::UnexpectedResponse("device/token carried no token".into()))
    }
}
