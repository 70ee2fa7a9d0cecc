// field.rs - Typed member selectors
//
// A field is a pair of plain function pointers, so it is Copy, Send and
// Sync regardless of the owner type and can travel inside a queued job.

use std::fmt;

/// Selects one member of type `Value` inside a `Root`.
///
/// Resolves against whatever `Root` instance is handed to it, so the same
/// descriptor works at read time and later when a deferred write runs.
pub struct Field<Root, Value> {
    name: &'static str,
    get: fn(&Root) -> &Value,
    get_mut: fn(&mut Root) -> &mut Value,
}

impl<Root, Value> Field<Root, Value> {
    /// Create a descriptor from a name and its accessor pair.
    pub const fn new(
        name: &'static str,
        get: fn(&Root) -> &Value,
        get_mut: fn(&mut Root) -> &mut Value,
    ) -> Self {
        Self { name, get, get_mut }
    }

    /// Member path as written at the call site.
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn get<'a>(&self, root: &'a Root) -> &'a Value {
        (self.get)(root)
    }

    #[inline]
    pub fn get_mut<'a>(&self, root: &'a mut Root) -> &'a mut Value {
        (self.get_mut)(root)
    }

    /// Store `value` into the member, returning the previous value.
    pub fn replace(&self, root: &mut Root, value: Value) -> Value {
        std::mem::replace(self.get_mut(root), value)
    }
}

impl<Root, Value> Clone for Field<Root, Value> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<Root, Value> Copy for Field<Root, Value> {}

impl<Root, Value> fmt::Debug for Field<Root, Value> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("root", &std::any::type_name::<Root>())
            .field("name", &self.name)
            .finish()
    }
}

/// Build a [`Field`] for a (possibly nested) member path.
///
/// # Example
/// ```ignore
/// struct Window { title: String, size: Size }
/// struct Size { width: u32, height: u32 }
///
/// let title = field!(Window, title);
/// let width = field!(Window, size.width);
/// ```
#[macro_export]
macro_rules! field {
    ($root:ty, $($path:ident).+) => {
        $crate::field::Field::<$root, _>::new(
            stringify!($($path).+),
            |root: &$root| &root $(.$path)+,
            |root: &mut $root| &mut root $(.$path)+,
        )
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Size {
        width: u32,
        height: u32,
    }

    struct Window {
        title: String,
        size: Size,
    }

    fn window() -> Window {
        Window {
            title: "untitled".to_string(),
            size: Size {
                width: 640,
                height: 480,
            },
        }
    }

    #[test]
    fn reads_and_writes_top_level_member() {
        let title = field!(Window, title);
        let mut w = window();

        assert_eq!(title.get(&w), "untitled");
        let previous = title.replace(&mut w, "main".to_string());
        assert_eq!(previous, "untitled");
        assert_eq!(w.title, "main");
    }

    #[test]
    fn nested_path_resolves_inner_member() {
        let width = field!(Window, size.width);
        let mut w = window();

        *width.get_mut(&mut w) += 160;
        assert_eq!(w.size.width, 800);
        assert_eq!(w.size.height, 480);
        assert!(width.name().starts_with("size") && width.name().ends_with("width"));
    }

    #[test]
    fn descriptor_is_copy_and_reusable_across_instances() {
        let height = field!(Window, size.height);
        let copy = height;
        let mut a = window();
        let mut b = window();

        height.replace(&mut a, 1);
        copy.replace(&mut b, 2);
        assert_eq!((a.size.height, b.size.height), (1, 2));
    }
}
