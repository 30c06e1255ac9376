mod filters;
mod paging;
