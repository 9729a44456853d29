#![forbid(unsafe_code)]

//! Everything the dashboard can be asked to do.

/// A dashboard action.
///
/// Key handlers and popup controls dispatch these through the store; the
/// reducers in [`crate::reducer`] interpret them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    NextMessage,
    PrevMessage,
    /// Requeue held messages, then fetch the DLQ again.
    LoadMessages,
    /// Give focus to the named view, replacing the current one.
    FocusView(String),
    /// Move focus along the tab cycle.
    FocusNextView,
    /// Publish held messages back to the DLQ.
    RequeueMessages,
    ToggleShowHeaders,
    /// Forget the message at this index.
    DropMessage(usize),
    /// Open the query picker, or close it when it is open.
    ShowQueriesListPopup,
    /// Close every popup.
    HidePopup,
    QueriesListNextOption,
    QueriesListPrevOption,
    /// Open the parameter form for the picked query, or close it.
    ShowFillQueryParamsPopup,
    FillQueryParamsNextField,
    FillQueryParamsPrevField,
    StartInputMode,
    StopInputMode,
    /// A typed character for the active text field.
    Input(char),
    InputBackspace,
    RunSqlQuery,
    HideSqlResults,
    SqlViewScrollDown,
    SqlViewScrollUp,
    SqlViewScrollLeft,
    SqlViewScrollRight,
    Exit,
}
