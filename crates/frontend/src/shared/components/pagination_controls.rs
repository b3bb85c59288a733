use leptos::prelude::*;

const DEFAULT_PAGE_SIZES: [usize; 4] = [10, 20, 50, 100];

/// Navigation buttons of the pager
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PageJump {
    First,
    Previous,
    Next,
    Last,
}

impl PageJump {
    const ALL: [PageJump; 4] = [Self::First, Self::Previous, Self::Next, Self::Last];

    fn glyph(self) -> &'static str {
        match self {
            Self::First => "«",
            Self::Previous => "‹",
            Self::Next => "›",
            Self::Last => "»",
        }
    }

    fn title(self) -> &'static str {
        match self {
            Self::First => "首页",
            Self::Previous => "上一页",
            Self::Next => "下一页",
            Self::Last => "末页",
        }
    }

    /// Page this button leads to, or `None` when it would not move.
    fn target(self, current: usize, total_pages: usize) -> Option<usize> {
        let last = total_pages.checked_sub(1)?;
        let target = match self {
            Self::First => 0,
            Self::Previous => current.checked_sub(1)?,
            Self::Next => current + 1,
            Self::Last => last,
        };
        (target <= last && target != current).then_some(target)
    }
}

/// Pager for a table view: jump buttons, "page / pages (count)" and a
/// page size select.
#[component]
pub fn PaginationControls(
    /// Current page (0-indexed)
    #[prop(into)]
    current_page: Signal<usize>,
    #[prop(into)] total_pages: Signal<usize>,
    /// Rows in the filtered view
    #[prop(into)]
    total_count: Signal<usize>,
    #[prop(into)] page_size: Signal<usize>,
    on_page_change: Callback<usize>,
    on_page_size_change: Callback<usize>,
    #[prop(optional)] page_size_options: Option<Vec<usize>>,
) -> impl IntoView {
    let sizes = page_size_options.unwrap_or_else(|| DEFAULT_PAGE_SIZES.to_vec());
    let target = move |jump: PageJump| jump.target(current_page.get(), total_pages.get());

    let button = move |jump: PageJump| {
        view! {
            <button
                class="pagination-btn"
                title=jump.title()
                disabled=move || target(jump).is_none()
                on:click=move |_| {
                    if let Some(page) = target(jump) {
                        on_page_change.run(page);
                    }
                }
            >
                {jump.glyph()}
            </button>
        }
    };
    let (head, tail) = PageJump::ALL.split_at(2);

    view! {
        <div class="pagination-controls">
            {head.iter().map(|&jump| button(jump)).collect_view()}
            <span class="pagination-info">
                {move || {
                    format!(
                        "{} / {} (共 {} 条)",
                        current_page.get() + 1,
                        total_pages.get().max(1),
                        total_count.get(),
                    )
                }}
            </span>
            {tail.iter().map(|&jump| button(jump)).collect_view()}
            <select
                class="page-size-select"
                prop:value=move || page_size.get().to_string()
                on:change=move |ev| {
                    match event_target_value(&ev).parse::<usize>() {
                        Ok(size) => on_page_size_change.run(size),
                        Err(e) => log::warn!("page size select: {}", e),
                    }
                }
            >
                {sizes
                    .into_iter()
                    .map(|size| {
                        view! {
                            <option value=size.to_string() selected=move || page_size.get() == size>
                                {format!("{} 条/页", size)}
                            </option>
                        }
                    })
                    .collect_view()}
            </select>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jump_targets() {
        assert_eq!(PageJump::First.target(2, 5), Some(0));
        assert_eq!(PageJump::Previous.target(2, 5), Some(1));
        assert_eq!(PageJump::Next.target(2, 5), Some(3));
        assert_eq!(PageJump::Last.target(2, 5), Some(4));
    }

    #[test]
    fn test_jumps_disabled_at_edges() {
        assert_eq!(PageJump::First.target(0, 5), None);
        assert_eq!(PageJump::Previous.target(0, 5), None);
        assert_eq!(PageJump::Next.target(4, 5), None);
        assert_eq!(PageJump::Last.target(4, 5), None);
        for jump in PageJump::ALL {
            assert_eq!(jump.target(0, 0), None);
        }
    }
}
