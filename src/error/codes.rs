/// Error code registry for templa
///
/// Error codes are organized by category:
/// - 1000-1999: Configuration errors
/// - 2000-2999: Builder stage errors
/// - 3000-3999: Template errors
/// - 4000-4999: User step errors
pub struct ErrorCode;

impl ErrorCode {
    // Configuration errors (1000-1999)
    pub const CONFIG_GENERIC: u16 = 1000;
    pub const CONFIG_DATA_NOT_LOADED: u16 = 1001;
    pub const CONFIG_DATA_INVALID: u16 = 1002;
    pub const CONFIG_NOT_A_MAPPING: u16 = 1003;
    pub const CONFIG_CONTEXT_NOT_A_MAPPING: u16 = 1004;
    pub const CONFIG_INVALID_OPTIONS: u16 = 1005;

    // Builder stage errors (2000-2999)
    pub const BUILDER_NOT_SAME_INSTANCE: u16 = 2001;
    pub const BUILDER_STAGE_VIOLATION: u16 = 2002;

    // Template errors (3000-3999)
    pub const TEMPLATE_RENDER_FAILED: u16 = 3001;

    // User step errors (4000-4999)
    pub const STEP_CONTEXT_FAILED: u16 = 4001;
    pub const STEP_PARSE_FAILED: u16 = 4002;
    pub const STEP_BUILD_FAILED: u16 = 4003;
}

/// Get a human-readable description for an error code
pub fn describe_error_code(code: u16) -> &'static str {
    match code {
        // Configuration errors
        1000 => "Generic configuration error",
        1001 => "Config data accessed before it was loaded",
        1002 => "Raw config could not be converted into config data",
        1003 => "Raw config is not a mapping",
        1004 => "Config data does not serialize to a mapping",
        1005 => "Invalid engine options",

        // Builder stage errors
        2001 => "Builder target belongs to another builder instance",
        2002 => "Operation not allowed at the builder's current stage",

        // Template errors
        3001 => "Template could not be compiled or rendered",

        // User step errors
        4001 => "Render context extension failed",
        4002 => "Parsing the rendered template failed",
        4003 => "Building the processed value failed",

        _ => "Unknown error code",
    }
}
