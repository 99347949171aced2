//! Decide how a field type takes part in a derived filter.

use syn::{GenericArgument, PathArguments, Type, TypePath};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// String, numeric, bool or date-time; the operator set comes from
    /// the type's `Filterable` impl.
    Scalar,
    /// Another filterable entity. Its filter is boxed so entities may
    /// refer to themselves.
    Nested,
    /// `Vec<Entity>`, filtered with quantifiers.
    Collection,
    /// No filter shape. Still a valid ordering key.
    Excluded,
}

impl FieldKind {
    pub fn is_filterable(self) -> bool {
        !matches!(self, FieldKind::Excluded)
    }
}

const SCALARS: &[&str] = &[
    "String", "bool", "i8", "i16", "i32", "i64", "isize", "u8", "u16", "u32", "u64", "usize",
    "f32", "f64", "DateTime",
];

/// Plain path types that are not entities even though they look like one.
const OPAQUE: &[&str] = &[
    "HashMap",
    "BTreeMap",
    "IndexMap",
    "Map",
    "HashSet",
    "BTreeSet",
    "IndexSet",
    "VecDeque",
    "LinkedList",
    "BinaryHeap",
    "Uuid",
    "Value",
    "Duration",
    "Instant",
    "SystemTime",
    "PathBuf",
    "Path",
    "OsString",
    "char",
    "str",
    "i128",
    "u128",
    "Arc",
    "Rc",
    "Cow",
    "Cell",
    "RefCell",
    "Mutex",
    "RwLock",
    "NaiveDate",
    "NaiveDateTime",
    "NaiveTime",
    "Url",
    "Bytes",
    "IpAddr",
    "Ipv4Addr",
    "Ipv6Addr",
    "SocketAddr",
    "Decimal",
];

pub fn classify(ty: &Type) -> FieldKind {
    let Some(path) = plain_path(peel(ty)) else {
        return FieldKind::Excluded;
    };
    let Some(last) = path.path.segments.last() else {
        return FieldKind::Excluded;
    };
    let name = last.ident.to_string();

    if SCALARS.contains(&name.as_str()) {
        return FieldKind::Scalar;
    }
    if name == "Vec" {
        return match single_type_arg(&last.arguments) {
            Some(inner) if plain_path(inner).is_some_and(is_entity) => FieldKind::Collection,
            _ => FieldKind::Excluded,
        };
    }
    if is_entity(path) {
        FieldKind::Nested
    } else {
        FieldKind::Excluded
    }
}

/// Strip `Option<_>` and `Box<_>` wrappers, which forward to the inner
/// type's filter.
fn peel(ty: &Type) -> &Type {
    let mut current = ty;
    loop {
        current = match current {
            Type::Paren(inner) => &inner.elem,
            Type::Group(inner) => &inner.elem,
            Type::Path(path) => match path.path.segments.last() {
                Some(seg) if seg.ident == "Option" || seg.ident == "Box" => {
                    match single_type_arg(&seg.arguments) {
                        Some(inner) => inner,
                        None => return current,
                    }
                }
                _ => return current,
            },
            _ => return current,
        };
    }
}

fn plain_path(ty: &Type) -> Option<&TypePath> {
    match ty {
        Type::Path(path) if path.qself.is_none() => Some(path),
        _ => None,
    }
}

/// A non-generic path that is neither a scalar nor a known opaque type.
fn is_entity(path: &TypePath) -> bool {
    let Some(last) = path.path.segments.last() else {
        return false;
    };
    if path
        .path
        .segments
        .iter()
        .any(|seg| !matches!(seg.arguments, PathArguments::None))
    {
        return false;
    }
    let name = last.ident.to_string();
    !SCALARS.contains(&name.as_str()) && !OPAQUE.contains(&name.as_str()) && name != "Vec"
}

fn single_type_arg(arguments: &PathArguments) -> Option<&Type> {
    let PathArguments::AngleBracketed(args) = arguments else {
        return None;
    };
    let mut types = args.args.iter().filter_map(|arg| match arg {
        GenericArgument::Type(ty) => Some(ty),
        _ => None,
    });
    let first = types.next()?;
    types.next().is_none().then_some(first)
}
