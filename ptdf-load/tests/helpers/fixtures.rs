//! Small data files in the layout of the real lists

pub const MOVIES: &str = "\
CRC: 0x7C4F1A2B  File: movies.list  Date: Fri Oct 15 00:00:00 2004

MOVIES LIST
===========

Incredibles, The (2004)\t\t\t\t\t2004
\"Lost\" (2004)\t\t\t\t\t2004-2010
\"Lost\" (2004) {Pilot (#1.1)}\t\t\t\t2004
Iron Giant, The (1999)\t\t\t\t\t1999

--------------------------------------------------------------------------------
";

/// Movies list with one title that does not parse
pub const MOVIES_WITH_BAD_LINE: &str = "\
MOVIES LIST
===========

Incredibles, The (2004)\t\t\t\t\t2004
(2004)\t\t\t2004
Iron Giant, The (1999)\t\t\t\t\t1999
--------------------------------------------------------------------------------
";

pub const ACTRESSES: &str = "\
THE ACTRESSES LIST
==================

Name\t\t\tTitles
----\t\t\t------
Hunt, Holly\t\tIncredibles, The (2004)  (voice)  [Helen Parr]  <2>
\t\t\tIron Giant, The (1999)  [Annie Hughes]  <3>

Vowell, Sarah\t\tIncredibles, The (2004)  (voice)  [Violet Parr]  <4>

-----------------------------------------------------------------------------
";

pub const AKA_NAMES: &str = "\
AKA NAMES LIST
=============

Hunt, Holly
   (aka Hunt, Holly Ann)

";

pub const AKA_TITLES: &str = "\
AKA TITLES LIST
===============



Incredibles, The (2004)
   (aka Unglaublichen, Die (2004))\t(Germany)

\"Lost\" (2004) {Pilot (#1.1)}
   (aka \"Verschollen\" (2004) {Pilot (#1.1)})\t(Germany)

---------------------------
";

pub const TRIVIA: &str = "\
FILM TRIVIA
===========

# Incredibles, The (2004)
- Helen's suit was redesigned
  twice.

-------------------------
";

pub const BIOGRAPHIES: &str = "\
BIOGRAPHY LIST
==============
-------------------------------------------------------------------------------
NM: Hunt, Holly

HT: 5' 2\"
BG: Holly Hunt grew up on a farm.
BY: Anonymous

-------------------------------------------------------------------------------
";

pub const MOVIE_LINKS: &str = "\
MOVIE LINKS LIST
================

Incredibles, The (2004)
  (follows Iron Giant, The (1999))

";

pub const GENRES: &str = "\
8: THE GENRES LIST
==================

Incredibles, The (2004)\t\t\t\tAnimation
Iron Giant, The (1999)\t\t\t\t\tAnimation
";

pub const TAGLINES: &str = "\
TAG LINES LIST
==============


# Incredibles, The (2004)
\tNo gut, no glory.
\tSave the day.

-----------------------------------------
";
