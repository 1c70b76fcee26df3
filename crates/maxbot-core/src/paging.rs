/// One page of a marker-paginated listing.
///
/// The marker is an opaque server-issued cursor: echo it back to fetch the
/// next page, never construct one. The expected loop is
///
/// ```text
/// let mut marker = None;
/// loop {
///     let page = client.get_chats(50, marker).await?;
///     // consume page.items ...
///     if page.is_last() { break; }
///     marker = page.marker;
/// }
/// ```
///
/// An absent input marker means "start from the beginning" (or "from now"
/// for long-poll updates); an absent output marker means no further pages.
#[derive(Clone, Debug, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub marker: Option<i64>,
}

impl<T> Page<T> {
    pub fn is_last(&self) -> bool {
        self.marker.is_none()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
