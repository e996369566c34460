use glfx_core::ApiError;
use glow::{
    DEBUG_OUTPUT, DEBUG_OUTPUT_SYNCHRONOUS, DEBUG_SEVERITY_HIGH, DEBUG_SEVERITY_MEDIUM, DEBUG_TYPE_ERROR, HasContext,
    INVALID_ENUM, INVALID_FRAMEBUFFER_OPERATION, INVALID_OPERATION, INVALID_VALUE, NO_ERROR, OUT_OF_MEMORY,
    STACK_OVERFLOW, STACK_UNDERFLOW,
};

/// Upper bound on error flags drained per check; a lost context can report errors forever.
const MAX_QUEUED_ERRORS: usize = 8;

pub fn enable_debug(gl: &mut impl HasContext) {
    unsafe {
        gl.enable(DEBUG_OUTPUT);
        gl.enable(DEBUG_OUTPUT_SYNCHRONOUS);
        gl.debug_message_callback(|_, kind, id, severity, message| {
            if kind == DEBUG_TYPE_ERROR || severity == DEBUG_SEVERITY_HIGH {
                log::error!("gl debug ({id}): {message}");
            } else if severity == DEBUG_SEVERITY_MEDIUM {
                log::warn!("gl debug ({id}): {message}");
            } else {
                log::debug!("gl debug ({id}): {message}");
            }
        });
    }
}

/// Return the oldest recorded error and clear the rest.
pub fn check_error(gl: &impl HasContext) -> Option<ApiError> {
    unsafe {
        let code = gl.get_error();
        if code == NO_ERROR {
            return None;
        }

        for _ in 0..MAX_QUEUED_ERRORS {
            if gl.get_error() == NO_ERROR {
                break;
            }
        }

        Some(ApiError {
            code,
            name: error_name(code),
        })
    }
}

pub fn error_name(code: u32) -> &'static str {
    match code {
        NO_ERROR => "GL_NO_ERROR",
        INVALID_ENUM => "GL_INVALID_ENUM",
        INVALID_VALUE => "GL_INVALID_VALUE",
        INVALID_OPERATION => "GL_INVALID_OPERATION",
        INVALID_FRAMEBUFFER_OPERATION => "GL_INVALID_FRAMEBUFFER_OPERATION",
        STACK_OVERFLOW => "GL_STACK_OVERFLOW",
        STACK_UNDERFLOW => "GL_STACK_UNDERFLOW",
        OUT_OF_MEMORY => "GL_OUT_OF_MEMORY",
        _ => "GL_UNKNOWN",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_known_codes() {
        assert_eq!(error_name(0x0502), "GL_INVALID_OPERATION");
        assert_eq!(error_name(0x0505), "GL_OUT_OF_MEMORY");
        assert_eq!(error_name(0x1234), "GL_UNKNOWN");
    }
}
