//! The pagination and cursor-injection engine.
//!
//! This is a pure, synchronous transform: given an already-materialized collection and
//! the client's `first`/`after` arguments, [`paginate`] deterministically produces a
//! windowed [`Page`]. A fresh page is created per resolver invocation and never
//! persisted; the only allocation beyond the window itself happens when cursors are
//! injected into copies of the windowed items.

use super::{
    global_id::{self, GlobalId},
    Error, Item,
};
use async_graphql::dynamic::ResolverContext;

/// The member injected into each paginated item to carry its cursor.
pub const CURSOR_FIELD: &str = "relayCursor";

/// Pagination arguments supplied by the client.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PageArgs {
    /// Limit the page to this many items.
    pub first: Option<i64>,
    /// Start the page at the offset encoded by this cursor.
    pub after: Option<String>,
}

impl PageArgs {
    /// Read `first` and `after` off a field's arguments.
    pub fn from_ctx(ctx: &ResolverContext<'_>) -> Result<Self, Error> {
        let first = match ctx.args.get("first") {
            Some(value) => Some(value.i64().map_err(|err| Error::custom(err.message))?),
            None => None,
        };
        let after = match ctx.args.get("after") {
            Some(value) => Some(
                value
                    .string()
                    .map_err(|err| Error::custom(err.message))?
                    .to_string(),
            ),
            None => None,
        };
        Ok(Self { first, after })
    }
}

/// One window of a collection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page {
    /// The items in this window, in collection order.
    pub items: Vec<Item>,
    /// The size of the full collection, counted before slicing.
    pub total: u64,
    /// The requested page size, or the collection size when no limit was requested.
    pub first: u64,
    /// The 1-based page number reconstructed from the cursor offset.
    pub current_page: u64,
}

/// Slice a window out of `collection` according to `args`.
///
/// With no `first` argument the entire collection is returned as a single page: no
/// pagination requested, no truncation. With `first`, the offset is recovered from the
/// `after` cursor (an absent or empty cursor means the start of the collection) and the
/// window is `collection[offset .. offset + first]`, shorter or empty near the end.
/// Negative arguments fail with [`Error::InvalidArgument`].
///
/// The page number is reconstructed as `(first + offset) / first`, which assumes the
/// cursor was produced by a request with the same `first` stride. Injected cursors are
/// `(position + 1) * current_page` under the cursor namespace, so the last cursor of
/// page `n` decodes to `n * first`: exactly the offset of page `n + 1`. Both
/// reconstructions assume an append-only collection paged with a constant stride;
/// cursors taken from the middle of a page land back on the same page.
pub fn paginate(collection: Vec<Item>, args: &PageArgs) -> Result<Page, Error> {
    let total = collection.len() as u64;
    let Some(first) = args.first else {
        return Ok(Page {
            items: collection,
            total,
            first: total,
            current_page: 1,
        });
    };
    if first < 0 {
        return Err(Error::InvalidArgument {
            name: "first",
            value: first,
        });
    }

    let after = match args.after.as_deref() {
        Some(token) if !token.is_empty() => global_id::cursor_id(token)?,
        _ => 0,
    };
    if after < 0 {
        return Err(Error::InvalidArgument {
            name: "after",
            value: after,
        });
    }

    let current_page = if first > 0 && after > 0 {
        ((first + after) / first) as u64
    } else {
        1
    };
    let items = collection
        .into_iter()
        .skip(after as usize)
        .take(first as usize)
        .collect::<Vec<_>>();
    tracing::trace!(total, first, after, current_page, "paginated collection");

    Ok(Page {
        items,
        total,
        first: first as u64,
        current_page,
    })
}

impl Page {
    /// The cursor of the item at `index` within this page.
    pub fn cursor_at(&self, index: usize) -> GlobalId {
        global_id::encode_cursor((index as i64 + 1) * self.current_page as i64)
    }

    /// Copies of this page's items with their cursors injected.
    ///
    /// This is the shared cursor-injection rule used by the default `edges` resolver:
    /// each item gets a [`CURSOR_FIELD`] member carrying [`cursor_at`](Self::cursor_at)
    /// of its position. Items that are not JSON objects are passed through unchanged
    /// (there is nowhere to put the cursor; it resolves to the empty string instead).
    pub fn items_with_cursors(&self) -> Vec<Item> {
        self.items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                let mut item = item.clone();
                if let Some(object) = item.as_object_mut() {
                    object.insert(
                        CURSOR_FIELD.into(),
                        String::from(self.cursor_at(index)).into(),
                    );
                }
                item
            })
            .collect()
    }

    /// Whether another page follows this one.
    pub fn has_next(&self) -> bool {
        self.current_page * self.first < self.total
    }

    /// Whether a page precedes this one.
    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    /// The cursor of this page's first item, if any.
    pub fn start_cursor(&self) -> Option<GlobalId> {
        (!self.items.is_empty()).then(|| self.cursor_at(0))
    }

    /// The cursor of this page's last item, if any.
    pub fn end_cursor(&self) -> Option<GlobalId> {
        (!self.items.is_empty()).then(|| self.cursor_at(self.items.len() - 1))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn ships() -> Vec<Item> {
        [10, 20, 30, 40, 50]
            .into_iter()
            .map(|id| json!({ "id": id }))
            .collect()
    }

    fn cursor_values(page: &Page) -> Vec<i64> {
        (0..page.items.len())
            .map(|index| global_id::cursor_id(&page.cursor_at(index)).unwrap())
            .collect()
    }

    #[test]
    fn test_full_page_without_first() {
        let page = paginate(ships(), &PageArgs::default()).unwrap();
        assert_eq!(page.items, ships());
        assert_eq!((page.total, page.first, page.current_page), (5, 5, 1));
        assert!(!page.has_next());
        assert!(!page.has_previous());
    }

    #[test]
    fn test_first_page() {
        let args = PageArgs {
            first: Some(2),
            after: None,
        };
        let page = paginate(ships(), &args).unwrap();
        assert_eq!(page.items, &ships()[..2]);
        assert_eq!((page.total, page.first, page.current_page), (5, 2, 1));
        assert_eq!(cursor_values(&page), [1, 2]);
        assert!(page.has_next());
        assert!(!page.has_previous());
    }

    #[test]
    fn test_empty_after_is_start_of_collection() {
        let args = PageArgs {
            first: Some(2),
            after: Some(String::new()),
        };
        let page = paginate(ships(), &args).unwrap();
        assert_eq!(page.items, &ships()[..2]);
        assert_eq!(page.current_page, 1);
    }

    #[test]
    fn test_following_the_last_cursor() {
        let first_page = paginate(
            ships(),
            &PageArgs {
                first: Some(2),
                after: None,
            },
        )
        .unwrap();

        // The last cursor of page 1 decodes to the offset of page 2.
        let second_page = paginate(
            ships(),
            &PageArgs {
                first: Some(2),
                after: Some(first_page.end_cursor().unwrap().into()),
            },
        )
        .unwrap();
        assert_eq!(second_page.items, &ships()[2..4]);
        assert_eq!(second_page.current_page, 2);
        assert_eq!(cursor_values(&second_page), [2, 4]);
        assert!(second_page.has_next());
        assert!(second_page.has_previous());

        let third_page = paginate(
            ships(),
            &PageArgs {
                first: Some(2),
                after: Some(second_page.end_cursor().unwrap().into()),
            },
        )
        .unwrap();
        assert_eq!(third_page.items, &ships()[4..]);
        assert_eq!(third_page.current_page, 3);
        assert!(!third_page.has_next());
    }

    #[test]
    fn test_first_zero() {
        let args = PageArgs {
            first: Some(0),
            after: None,
        };
        let page = paginate(ships(), &args).unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.current_page, 1);
        assert_eq!(page.start_cursor(), None);
        assert_eq!(page.end_cursor(), None);
    }

    #[test]
    fn test_offset_past_the_end() {
        let args = PageArgs {
            first: Some(2),
            after: Some(global_id::encode_cursor(10).into()),
        };
        let page = paginate(ships(), &args).unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total, 5);
    }

    #[test]
    fn test_negative_arguments() {
        let args = PageArgs {
            first: Some(-1),
            after: None,
        };
        assert!(matches!(
            paginate(ships(), &args),
            Err(Error::InvalidArgument { name: "first", .. })
        ));

        let args = PageArgs {
            first: Some(2),
            after: Some(global_id::encode_cursor(-3).into()),
        };
        assert!(matches!(
            paginate(ships(), &args),
            Err(Error::InvalidArgument { name: "after", .. })
        ));
    }

    #[test]
    fn test_malformed_cursor() {
        let args = PageArgs {
            first: Some(2),
            after: Some("not-base64!!!".into()),
        };
        assert!(matches!(
            paginate(ships(), &args),
            Err(Error::MalformedIdentifier { .. })
        ));
    }

    #[test]
    fn test_cursor_injection() {
        let page = paginate(
            ships(),
            &PageArgs {
                first: Some(2),
                after: None,
            },
        )
        .unwrap();
        let injected = page.items_with_cursors();
        for (index, item) in injected.iter().enumerate() {
            assert_eq!(
                item[CURSOR_FIELD].as_str().unwrap(),
                String::from(page.cursor_at(index))
            );
        }
        // Injection copies; the page itself is untouched.
        assert!(page.items.iter().all(|item| item.get(CURSOR_FIELD).is_none()));
    }

    #[test]
    fn test_injection_skips_non_objects() {
        let page = paginate(vec![json!(1), json!(2)], &PageArgs::default()).unwrap();
        assert_eq!(page.items_with_cursors(), vec![json!(1), json!(2)]);
    }

    #[test]
    fn test_cursor_determinism() {
        let args = PageArgs {
            first: Some(3),
            after: Some(global_id::encode_cursor(3).into()),
        };
        let one = paginate(ships(), &args).unwrap();
        let two = paginate(ships(), &args).unwrap();
        assert_eq!(one, two);
        assert_eq!(one.items_with_cursors(), two.items_with_cursors());
    }

    proptest! {
        #[test]
        fn test_bounded_slice(
            total in 0usize..16,
            first in 0i64..24,
            offset in 0i64..24,
        ) {
            let collection = (0..total).map(|id| json!({ "id": id })).collect::<Vec<_>>();
            let args = PageArgs {
                first: Some(first),
                after: Some(global_id::encode_cursor(offset).into()),
            };
            let page = paginate(collection, &args).unwrap();
            let expected = (first as usize).min(total.saturating_sub(offset as usize));
            prop_assert_eq!(page.items.len(), expected);
            prop_assert_eq!(page.total, total as u64);
        }
    }
}
