use clap::{Args as ClapArgs, Parser, Subcommand};

use crate::store::{FilterType, SortBy, ViewMode};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Print raw json instead of a table
    #[clap(long, global = true, default_value = "false")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(ClapArgs, Debug, Clone, Default)]
pub struct ViewArgs {
    /// Only show bookmarks of this collection id
    #[clap(short, long)]
    pub collection: Option<String>,

    /// Only show bookmarks carrying this tag id (repeatable)
    #[clap(short, long = "tag")]
    pub tags: Vec<String>,

    /// Filter by favorite/tag state
    #[clap(short, long, value_enum)]
    pub filter: Option<FilterType>,

    /// Sort order
    #[clap(short, long, value_enum)]
    pub sort: Option<SortBy>,

    /// Output layout
    #[clap(long, value_enum)]
    pub view: Option<ViewMode>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum TagAction {
    /// Create a tag
    Add {
        name: String,

        /// Color class
        #[clap(long)]
        color: Option<String>,
    },
    /// Delete a tag
    Rm { id: String },
}

#[derive(Subcommand, Debug, Clone)]
pub enum CollectionAction {
    /// Create a collection
    Add {
        name: String,

        /// Icon key (bookmark, palette, code, wrench, book-open, sparkles)
        #[clap(long)]
        icon: Option<String>,

        /// Color
        #[clap(long)]
        color: Option<String>,
    },
    /// Rename or restyle a collection
    Update {
        id: String,

        #[clap(long)]
        name: Option<String>,

        #[clap(long)]
        icon: Option<String>,

        #[clap(long)]
        color: Option<String>,
    },
    /// Show one collection
    Show { id: String },
    /// Delete a collection
    Rm { id: String },
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List bookmarks
    List {
        #[command(flatten)]
        view: ViewArgs,
    },

    /// Semantic search. Falls back to the filtered list when nothing matches.
    Search {
        query: String,

        #[command(flatten)]
        view: ViewArgs,
    },

    /// Show one bookmark
    Show { id: String },

    /// List favorites as the backend reports them
    Favorites {},

    /// List tags
    Tags {},

    /// List collections
    Collections {},

    /// Create a bookmark
    Add {
        /// a url
        #[clap(short, long)]
        url: String,

        /// Bookmark title
        #[clap(short, long)]
        title: String,

        /// Bookmark description
        #[clap(short, long, default_value = "")]
        description: String,

        /// Collection id
        #[clap(short, long)]
        collection: String,

        /// Tag id (repeatable)
        #[clap(long = "tag-id")]
        tag_ids: Vec<String>,

        /// Mark as favorite
        #[clap(long, default_value = "false")]
        favorite: bool,
    },

    /// Update a bookmark
    Edit {
        id: String,

        #[clap(short, long)]
        url: Option<String>,

        #[clap(short, long)]
        title: Option<String>,

        #[clap(short, long)]
        description: Option<String>,

        /// Move to collection id
        #[clap(short, long)]
        collection: Option<String>,

        /// Replace tags with these tag ids (repeatable)
        #[clap(long = "tag-id")]
        tag_ids: Option<Vec<String>>,
    },

    /// Delete a bookmark
    Rm {
        id: String,

        /// Auto confirm
        #[clap(short, long, default_value = "false")]
        yes: bool,
    },

    /// Mark a bookmark as favorite
    Fav {
        id: String,

        /// Unmark instead
        #[clap(long, default_value = "false")]
        off: bool,
    },

    /// Manage tags
    Tag {
        #[command(subcommand)]
        action: TagAction,
    },

    /// Manage collections
    Collection {
        #[command(subcommand)]
        action: CollectionAction,
    },
}
