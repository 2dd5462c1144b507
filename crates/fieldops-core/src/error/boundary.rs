/// Declare how errors from a lower layer become errors of this one.
///
/// Expands to a `From` impl, so `?` performs the conversion at the crate
/// boundary without `map_err` noise at every call site. The transport crate
/// uses it to turn its own errors into [`FailureSignal`](crate::FailureSignal)s
/// for the taxonomy.
///
/// # Syntax
///
/// ```ignore
/// error_boundary!(SourceError => TargetError, |err_var| {
///     // conversion logic returning TargetError
/// });
/// ```
///
/// # Example
///
/// ```
/// use fieldops_core::{FailureSignal, error_boundary};
///
/// #[derive(Debug, thiserror::Error)]
/// enum DialError {
///     #[error("refused: {0}")]
///     Refused(String),
///     #[error("malformed target: {0}")]
///     Malformed(String),
/// }
///
/// struct Signal(FailureSignal);
///
/// error_boundary!(DialError => Signal, |e| {
///     match e {
///         DialError::Refused(_) => Signal(FailureSignal::Connection(Box::new(e))),
///         DialError::Malformed(msg) => Signal(FailureSignal::Invalid(msg)),
///     }
/// });
///
/// let Signal(signal) = DialError::Malformed("no host".into()).into();
/// assert!(matches!(signal, FailureSignal::Invalid(_)));
/// ```
#[macro_export]
macro_rules! error_boundary {
    ($inner:ty => $outer:ty, |$err:ident| $body:expr) => {
        impl ::std::convert::From<$inner> for $outer {
            fn from($err: $inner) -> $outer {
                $body
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::{Error, ErrorKind, FailureSignal, TimeoutPhase};

    #[derive(Debug, thiserror::Error)]
    enum SocketError {
        #[error("reset by peer")]
        Reset,
        #[error("read timed out")]
        Stalled,
    }

    struct Wrapped(Error);

    error_boundary!(SocketError => Wrapped, |e| {
        match e {
            SocketError::Reset => Wrapped(FailureSignal::Connection(Box::new(e)).into()),
            SocketError::Stalled => Wrapped(FailureSignal::Timeout(Some(Box::new(e))).into()),
        }
    });

    fn read_frame(fail_with: SocketError) -> Result<(), Wrapped> {
        Err(fail_with)?;
        Ok(())
    }

    #[test]
    fn test_boundary_enables_question_mark() {
        let Err(Wrapped(error)) = read_frame(SocketError::Reset) else {
            panic!("expected failure");
        };
        assert_eq!(error.kind(), ErrorKind::Transport);
        assert!(error.to_string().contains("reset by peer"));
    }

    #[test]
    fn test_boundary_preserves_timeout_phase() {
        let Err(Wrapped(error)) = read_frame(SocketError::Stalled) else {
            panic!("expected failure");
        };
        match error {
            Error::Timeout { phase, .. } => assert_eq!(phase, TimeoutPhase::Attempt),
            other => panic!("expected timeout, got {other:?}"),
        }
    }
}
