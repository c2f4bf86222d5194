use napi::Result as NapiResult;
use napi_derive::napi;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Waterfall
// ---------------------------------------------------------------------------

#[napi]
pub fn compute_waterfall(input_json: String) -> NapiResult<String> {
    let input: carry_core::waterfall::WaterfallInputs =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = carry_core::waterfall::compute_waterfall(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

/// Reference defaults, for pre-filling input forms.
#[napi]
pub fn default_waterfall_inputs() -> NapiResult<String> {
    serde_json::to_string(&carry_core::waterfall::WaterfallInputs::default())
        .map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Sensitivity
// ---------------------------------------------------------------------------

#[napi]
pub fn waterfall_sensitivity(input_json: String) -> NapiResult<String> {
    let input: carry_core::sensitivity::WaterfallSensitivityInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = carry_core::sensitivity::evaluate_waterfall_sensitivity(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
