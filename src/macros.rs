// cross module macros go here
#[macro_export]
macro_rules! assert_reflects {
    ($input: expr, level: $level: expr, code_block: $code_block: expr) => {
	let reflection = $crate::reflect::reflect($input);
	assert_eq!(reflection.level(), $level, "level of {:?}", $input);
	assert_eq!(reflection.is_code_block(), $code_block, "code block state of {:?}", $input);
	assert_eq!(reflection.syntax_error(), None, "syntax error in {:?}", $input);
    };
}

#[macro_export]
macro_rules! assert_syntax_error {
    ($input: expr) => {
	let reflection = $crate::reflect::reflect($input);
	assert!(reflection.has_syntax_error(), "expected a syntax error in {:?}", $input);
	assert!(!reflection.is_code_block(), "code block state of {:?}", $input);
    };
    ($input: expr, $message: expr) => {
	let reflection = $crate::reflect::reflect($input);
	assert_eq!(reflection.syntax_error(), Some($message), "syntax error in {:?}", $input);
	assert!(!reflection.is_code_block(), "code block state of {:?}", $input);
    };
}
