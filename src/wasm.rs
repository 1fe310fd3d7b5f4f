use wasm_bindgen::prelude::*;

use crate::host::{Host, error_value};

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = JSON)]
    fn parse(s: &str) -> JsValue;
}

fn to_js(value: &serde_json::Value) -> JsValue {
    match serde_json::to_string(value) {
        Ok(json_str) => parse(&json_str),
        Err(_) => JsValue::NULL,
    }
}

/// Deployment built once from config JSON and reused for every call.
#[wasm_bindgen]
pub struct WasmDeployment {
    host: Host,
}

#[wasm_bindgen]
impl WasmDeployment {
    /// Throws `{ok: false, error, class}` when the config does not build.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Result<WasmDeployment, JsValue> {
        Host::from_config_json(config_json)
            .map(|host| Self { host })
            .map_err(|e| to_js(&error_value(&e)))
    }

    pub fn achievement_vocabulary(&self) -> JsValue {
        to_js(&self.host.achievement_vocabulary())
    }

    pub fn encode_achievements(&self, flags_json: &str) -> JsValue {
        to_js(&self.host.encode_achievements(flags_json))
    }

    pub fn validate_transaction(
        &self,
        tx_base64: &str,
        signer: &str,
        expected_json: &str,
        kind: &str,
    ) -> JsValue {
        to_js(
            &self
                .host
                .validate_transaction(tx_base64, signer, expected_json, kind),
        )
    }
}
