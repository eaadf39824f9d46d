// Shorthand for return Err(TafError::new(ErrorKind::Foo))
//
// Usage:
// - err!(Variant) -> return Err(TafError::new(ErrorKind::Variant))
macro_rules! err {
	($variant:ident) => {
		return Err(crate::error::TafError::new(crate::error::ErrorKind::$variant))
	};
}

// Shorthand for HeaderDecodeError::new(HeaderDecodeErrorKind::Foo, offset, declared, available)
//
// Usage:
//
// - header_err!(Variant, offset, declared, available)
//
// or bail:
//
// - header_err!(@BAIL Variant, offset, declared, available)
macro_rules! header_err {
	(@BAIL $variant:ident, $offset:expr, $declared:expr, $available:expr) => {
		return Err(header_err!($variant, $offset, $declared, $available))
	};
	($variant:ident, $offset:expr, $declared:expr, $available:expr) => {
		Into::<crate::error::TafError>::into(crate::error::HeaderDecodeError::new(
			crate::error::HeaderDecodeErrorKind::$variant,
			$offset,
			$declared,
			$available,
		))
	};
}

// Shorthand for StreamFormatError::new(page, "Message")
//
// Usage:
//
// - stream_err!(page, Message)
//
// or bail:
//
// - stream_err!(@BAIL page, Message)
macro_rules! stream_err {
	(@BAIL $page:expr, $reason:literal) => {
		return Err(stream_err!($page, $reason))
	};
	($page:expr, $reason:literal) => {
		Into::<crate::error::TafError>::into(crate::error::StreamFormatError::new($page, $reason))
	};
}

// Pick a handler based on the `ParsingMode`
//
// Modes without a handler fall through to `DEFAULT`, so `Strict` can bail while
// `BestAttempt` and `Relaxed` only warn.
//
// Usage:
//
// - parse_mode_choice!(
// 		ident_of_parsing_mode,
// 		STRICT: some_expr,
// 		RELAXED: some_expr,
// 		DEFAULT: some_expr
// 	 )
macro_rules! parse_mode_choice {
	(
		$parse_mode:ident,
		$(STRICT: $strict_handler:expr,)?
		$(RELAXED: $relaxed_handler:expr,)?
		DEFAULT: $default:expr
	) => {
		match $parse_mode {
			$(crate::config::ParsingMode::Strict => { $strict_handler },)?
			$(crate::config::ParsingMode::Relaxed => { $relaxed_handler },)?
			_ => { $default }
		}
	};
}

pub(crate) use {err, header_err, parse_mode_choice, stream_err};
