pub type Result<T> = ::std::result::Result<T, ::failure::Error>;

/// Drains the GL error queue and reports the first pending error.
///
/// The demos call this after the batches of state setup in `startup`, where
/// a mistyped enum or a broken binding would otherwise fail silently.
pub unsafe fn check_gl() -> Result<()> {
    match gl::GetError() {
        gl::NO_ERROR => Ok(()),
        gl::INVALID_ENUM => bail!("[GL] An unacceptable value is specified for an enumerated argument."),
        gl::INVALID_VALUE => bail!("[GL] A numeric argument is out of range."),
        gl::INVALID_OPERATION => bail!("[GL] The specified operation is not allowed in the current state."),
        gl::INVALID_FRAMEBUFFER_OPERATION => bail!("[GL] The framebuffer object is not complete."),
        gl::OUT_OF_MEMORY => bail!("[GL] There is not enough memory left to execute the command."),
        gl::STACK_UNDERFLOW => bail!("[GL] An attempt has been made to perform an operation that would cause an internal stack to underflow."),
        gl::STACK_OVERFLOW => bail!("[GL] An attempt has been made to perform an operation that would cause an internal stack to overflow."),
        other => bail!("[GL] Unknown error 0x{:04x}.", other),
    }
}
