use core::fmt::Display;
use std::error::Error;

macro_rules! define_errors {
    ($(($err_name: ident, $err_descr: expr)),+) => {
        $(
            #[doc = $err_descr]
            #[derive(Debug,Clone)]
            pub struct $err_name(
                #[doc = "Error message associated with "]
                #[doc = stringify!($err_name)]
                #[doc = " error type."]
                pub String,
            );

            impl Display for $err_name {
                fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                    write!(f, "{}", self.0)
                }
            }

            impl Error for $err_name {}
        )+
    }
}

define_errors!(
    (
        SetupError,
        "Occurs when constructing samplers, injectors, containers or settings with invalid values"
    ),
    (
        IndexError,
        "Can occur when requesting a level, tile or attribute which is not present"
    ),
    (BoundaryError, "Can occur during construction or evaluation of boundaries"),
    (
        RngError,
        "Can occur when generating distributions or drawing samples from them."
    )
);

impl From<BoundaryError> for SetupError {
    fn from(value: BoundaryError) -> Self {
        SetupError(format!("{}", value))
    }
}

impl From<RngError> for SetupError {
    fn from(value: RngError) -> Self {
        SetupError(format!("{}", value))
    }
}

/// For internal use: formats an error message to include the location where it occurred.
#[macro_export]
macro_rules! format_error_message(
    (@function) => {
        {
            fn f() {}
            let name = std::any::type_name_of_val(&f);
            name.strip_suffix("::f").unwrap_or(name)
        }
    };
    ($bug_title:expr, $error_msg:expr) => {
        {
            format!("Internal Error in function {} (file {} line {}): +++ {} +++ {}",
                $crate::format_error_message!(@function),
                file!(),
                line!(),
                $bug_title,
                $error_msg,
            )
        }
    };
);
