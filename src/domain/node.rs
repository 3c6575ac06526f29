//! Node Records
//!
//! One record per invocation of a traced function.

use std::fmt;
use std::hash::Hash;

/// Sequential id assigned in discovery order, starting at 0.
pub type NodeId = usize;

/// Argument tuple of a traced call.
///
/// The tuple is both the memoization key and the display payload, so it must be
/// hashable and able to render each positional argument on its own.
pub trait CallArgs: Clone + Eq + Hash {
    /// One display string per positional argument.
    fn display_parts(&self) -> Vec<String>;
}

macro_rules! impl_call_args_scalar {
    ($($t:ty),* $(,)?) => {
        $(
            impl CallArgs for $t {
                fn display_parts(&self) -> Vec<String> {
                    vec![self.to_string()]
                }
            }
        )*
    };
}

impl_call_args_scalar!(
    u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, bool, char, String,
    &'static str,
);

impl CallArgs for () {
    fn display_parts(&self) -> Vec<String> {
        Vec::new()
    }
}

impl<T: CallArgs> CallArgs for Vec<T> {
    fn display_parts(&self) -> Vec<String> {
        let items: Vec<String> = self.iter().map(|item| item.display_parts().join(",")).collect();
        vec![format!("[{}]", items.join(", "))]
    }
}

macro_rules! impl_call_args_tuple {
    ($($name:ident),+) => {
        impl<$($name: CallArgs),+> CallArgs for ($($name,)+) {
            #[allow(non_snake_case)]
            fn display_parts(&self) -> Vec<String> {
                let ($($name,)+) = self;
                vec![$($name.display_parts().join(",")),+]
            }
        }
    };
}

impl_call_args_tuple!(A);
impl_call_args_tuple!(A, B);
impl_call_args_tuple!(A, B, C);
impl_call_args_tuple!(A, B, C, D);
impl_call_args_tuple!(A, B, C, D, E);
impl_call_args_tuple!(A, B, C, D, E, F);

/// Return value of a traced call, shown the way a user would print it.
pub trait CallOutput: Clone {
    fn display_output(&self) -> String;
}

macro_rules! impl_call_output_scalar {
    ($($t:ty),* $(,)?) => {
        $(
            impl CallOutput for $t {
                fn display_output(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

impl_call_output_scalar!(
    u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, f32, f64, bool, char,
    String, &'static str,
);

impl CallOutput for () {
    fn display_output(&self) -> String {
        "()".to_string()
    }
}

impl<T: CallOutput> CallOutput for Option<T> {
    fn display_output(&self) -> String {
        match self {
            Some(value) => value.display_output(),
            None => "None".to_string(),
        }
    }
}

impl<T: CallOutput> CallOutput for Vec<T> {
    fn display_output(&self) -> String {
        let items: Vec<String> = self.iter().map(CallOutput::display_output).collect();
        format!("[{}]", items.join(", "))
    }
}

macro_rules! impl_call_output_tuple {
    ($($name:ident),+) => {
        impl<$($name: CallOutput),+> CallOutput for ($($name,)+) {
            #[allow(non_snake_case)]
            fn display_output(&self) -> String {
                let ($($name,)+) = self;
                let items: Vec<String> = vec![$($name.display_output()),+];
                format!("({})", items.join(", "))
            }
        }
    };
}

impl_call_output_tuple!(A, B);
impl_call_output_tuple!(A, B, C);
impl_call_output_tuple!(A, B, C, D);

/// Join the selected positional arguments with `,`.
///
/// `selection` holds argument indices; indices past the end are skipped. `None`
/// shows every argument.
pub fn join_display_parts(parts: &[String], selection: Option<&[usize]>) -> String {
    match selection {
        Some(indices) => indices
            .iter()
            .filter_map(|&i| parts.get(i).map(String::as_str))
            .collect::<Vec<_>>()
            .join(","),
        None => parts.join(","),
    }
}

/// A single invocation of the traced function.
#[derive(Debug, Clone, PartialEq)]
pub struct Node<A, R> {
    pub id: NodeId,
    /// Positional arguments; also the memoization key
    pub input: A,
    /// Set once, when the call returns
    pub output: Option<R>,
    /// Call-stack height at invocation
    pub depth: usize,
    pub discovery: usize,
    /// Set once, when the call returns
    pub finish: Option<usize>,
}

impl<A, R> Node<A, R> {
    pub(crate) fn open(id: NodeId, input: A, depth: usize, discovery: usize) -> Self {
        Self {
            id,
            input,
            output: None,
            depth,
            discovery,
            finish: None,
        }
    }

    pub(crate) fn close(&mut self, output: R, finish: usize) {
        debug_assert!(self.finish.is_none(), "node {} finished twice", self.id);
        debug_assert!(self.discovery < finish);
        self.output = Some(output);
        self.finish = Some(finish);
    }

    pub fn is_finished(&self) -> bool {
        self.finish.is_some()
    }
}

impl<A: CallArgs, R: CallOutput> fmt::Display for Node<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Node(id={}, input=({}), output={}, depth={}, discovery={}, finish={})",
            self.id,
            self.input.display_parts().join(","),
            self.output
                .as_ref()
                .map(CallOutput::display_output)
                .unwrap_or_else(|| "-".to_string()),
            self.depth,
            self.discovery,
            self.finish
                .map(|t| t.to_string())
                .unwrap_or_else(|| "-".to_string()),
        )
    }
}
